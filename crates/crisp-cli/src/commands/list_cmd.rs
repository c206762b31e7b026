//! `crisp list` and `crisp show`.

use crisp_core::api::ListQuery;
use crisp_core::collection::CollectionView;
use crisp_core::models::{
    Incident, Indicator, ListRecord, Notification, Organization, TrustRelationship, User,
};
use crisp_core::ResourceKind;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cli::ListArgs;
use crate::commands::common::{
    columns_for, format_row, parse_filters, resolve_record_id, AppContext,
};
use crate::error::CliError;

pub async fn run_list(context: &AppContext, args: &ListArgs) -> Result<(), CliError> {
    match args.resource {
        ResourceKind::Users => render::<User>(context, args).await,
        ResourceKind::Organizations => render::<Organization>(context, args).await,
        ResourceKind::Indicators => render::<Indicator>(context, args).await,
        ResourceKind::Incidents => render::<Incident>(context, args).await,
        ResourceKind::TrustRelationships => render::<TrustRelationship>(context, args).await,
        ResourceKind::Notifications => render::<Notification>(context, args).await,
    }
}

async fn render<T>(context: &AppContext, args: &ListArgs) -> Result<(), CliError>
where
    T: ListRecord + DeserializeOwned + Serialize,
{
    let filters = parse_filters(&args.filters)?;

    let rows: Vec<T> = context
        .client
        .list(args.resource, &ListQuery::default())
        .await?;

    let mut view = CollectionView::new(context.config.items_per_page);
    view.finish_load(rows);
    if let Some(search) = &args.search {
        view.set_search_term(search.clone());
    }
    for (key, value) in filters {
        view.set_filter(key, value);
    }
    if let Some(sort) = &args.sort {
        view.toggle_sort(sort.clone());
        if args.desc {
            view.toggle_sort(sort.clone());
        }
    }
    view.set_page(args.page);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view.visible_page())?);
        return Ok(());
    }

    if view.is_empty() {
        println!("No matching records.");
        return Ok(());
    }

    let columns = columns_for(args.resource);
    for record in view.visible_page() {
        println!("{}", format_row(&record, columns));
    }
    println!(
        "Page {} of {} ({} matching)",
        view.current_page(),
        view.page_count(),
        view.filtered().len()
    );
    Ok(())
}

pub async fn run_show(
    context: &AppContext,
    kind: ResourceKind,
    id: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let id = resolve_record_id(&context.client, kind, id).await?;
    let record: Value = context.client.get_one(kind, &id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    match record.as_object() {
        Some(fields) => {
            for (key, value) in fields {
                match value.as_str() {
                    Some(text) => println!("{key}: {text}"),
                    None => println!("{key}: {value}"),
                }
            }
        }
        None => println!("{record}"),
    }
    Ok(())
}
