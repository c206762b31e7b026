//! Mutating commands: create, update, deactivate/reactivate, trust
//! responses, mark-read, delete.
//!
//! Every mutation goes through the confirmation gate before anything is
//! sent; a declined prompt issues no request at all. Only permanent deletes
//! are flagged destructive (extra warning line).

use crisp_core::collection::BulkOutcome;
use crisp_core::ResourceKind;
use serde_json::Value;

use crate::commands::common::{resolve_record_id, short_id, AppContext};
use crate::confirm::{confirm, ConfirmationRequest};
use crate::error::CliError;

fn gate(action: &str, target: String, destructive: bool) -> ConfirmationRequest {
    if destructive {
        ConfirmationRequest::destructive(action, target)
    } else {
        ConfirmationRequest::new(action, target)
    }
}

/// Run the confirmation gate; a decline prints and sends nothing.
fn approved(request: &ConfirmationRequest, assume_yes: bool) -> Result<bool, CliError> {
    if confirm(request, assume_yes)? {
        Ok(true)
    } else {
        println!("Cancelled; nothing sent.");
        Ok(false)
    }
}

fn parse_payload(data: &str) -> Result<Value, CliError> {
    let payload: Value =
        serde_json::from_str(data).map_err(|error| CliError::InvalidPayload(error.to_string()))?;
    if payload.is_object() {
        Ok(payload)
    } else {
        Err(CliError::InvalidPayload(
            "expected a JSON object".to_string(),
        ))
    }
}

fn created_id(record: &Value) -> String {
    record
        .get("id")
        .and_then(Value::as_str)
        .map_or_else(|| "?".to_string(), str::to_string)
}

pub async fn run_create(
    context: &AppContext,
    kind: ResourceKind,
    data: &str,
    as_json: bool,
    assume_yes: bool,
) -> Result<(), CliError> {
    let payload = parse_payload(data)?;
    let request = gate("Create", format!("a new {}", kind.singular()), false);
    if !approved(&request, assume_yes)? {
        return Ok(());
    }

    let created: Value = context.client.create(kind, &payload).await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!("Created {} {}", kind.singular(), created_id(&created));
    }
    Ok(())
}

pub async fn run_update(
    context: &AppContext,
    kind: ResourceKind,
    id: &str,
    data: &str,
    as_json: bool,
    assume_yes: bool,
) -> Result<(), CliError> {
    let payload = parse_payload(data)?;
    let id = resolve_record_id(&context.client, kind, id).await?;
    let request = gate(
        "Update",
        format!("{} {}", kind.singular(), short_id(&id)),
        false,
    );
    if !approved(&request, assume_yes)? {
        return Ok(());
    }

    let updated: Value = context.client.update(kind, &id, &payload).await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        println!("Updated {} {}", kind.singular(), short_id(&id));
    }
    Ok(())
}

pub async fn run_deactivate(
    context: &AppContext,
    kind: ResourceKind,
    id: &str,
    assume_yes: bool,
) -> Result<(), CliError> {
    let id = resolve_record_id(&context.client, kind, id).await?;
    let request = gate(
        "Deactivate",
        format!("{} {}", kind.singular(), short_id(&id)),
        false,
    );
    if !approved(&request, assume_yes)? {
        return Ok(());
    }

    context.client.deactivate(kind, &id).await?;
    println!("Deactivated {} {}", kind.singular(), short_id(&id));
    Ok(())
}

pub async fn run_reactivate(
    context: &AppContext,
    kind: ResourceKind,
    id: &str,
    assume_yes: bool,
) -> Result<(), CliError> {
    let id = resolve_record_id(&context.client, kind, id).await?;
    let request = gate(
        "Reactivate",
        format!("{} {}", kind.singular(), short_id(&id)),
        false,
    );
    if !approved(&request, assume_yes)? {
        return Ok(());
    }

    context.client.reactivate(kind, &id).await?;
    println!("Reactivated {} {}", kind.singular(), short_id(&id));
    Ok(())
}

/// Accept or decline a pending trust relationship.
pub async fn run_respond(
    context: &AppContext,
    id: &str,
    accept: bool,
    assume_yes: bool,
) -> Result<(), CliError> {
    let kind = ResourceKind::TrustRelationships;
    let id = resolve_record_id(&context.client, kind, id).await?;
    let verb = if accept { "Accept" } else { "Decline" };
    let request = gate(verb, format!("trust relationship {}", short_id(&id)), false);
    if !approved(&request, assume_yes)? {
        return Ok(());
    }

    let action = if accept { "accept" } else { "decline" };
    context.client.perform_action(kind, &id, action).await?;
    println!(
        "{} trust relationship {}",
        if accept { "Accepted" } else { "Declined" },
        short_id(&id)
    );
    Ok(())
}

/// Mark a notification as read.
pub async fn run_mark_read(
    context: &AppContext,
    id: &str,
    assume_yes: bool,
) -> Result<(), CliError> {
    let kind = ResourceKind::Notifications;
    let id = resolve_record_id(&context.client, kind, id).await?;
    let request = gate(
        "Mark",
        format!("notification {} as read", short_id(&id)),
        false,
    );
    if !approved(&request, assume_yes)? {
        return Ok(());
    }

    context.client.perform_action(kind, &id, "mark-read").await?;
    println!("Marked notification {} as read", short_id(&id));
    Ok(())
}

/// Permanently delete one or more records.
///
/// Ids are resolved up front, the whole batch is confirmed once, then each
/// record gets its own delete call. Per-item failures are reported together
/// and the command exits non-zero if any call failed.
pub async fn run_delete(
    context: &AppContext,
    kind: ResourceKind,
    ids: &[String],
    assume_yes: bool,
) -> Result<(), CliError> {
    let mut resolved = Vec::with_capacity(ids.len());
    for id in ids {
        resolved.push(resolve_record_id(&context.client, kind, id).await?);
    }

    let target = if resolved.len() == 1 {
        format!("{} {}", kind.singular(), short_id(&resolved[0]))
    } else {
        format!("{} {}", resolved.len(), kind)
    };
    let request = gate("Permanently delete", target, true);
    if !approved(&request, assume_yes)? {
        return Ok(());
    }

    let mut outcomes = Vec::with_capacity(resolved.len());
    for id in &resolved {
        let error = context
            .client
            .delete_permanently(kind, id)
            .await
            .err()
            .map(|error| error.to_string());
        outcomes.push(BulkOutcome {
            id: id.clone(),
            error,
        });
    }

    let failures: Vec<&BulkOutcome> = outcomes
        .iter()
        .filter(|outcome| outcome.error.is_some())
        .collect();
    if failures.is_empty() {
        println!("Deleted {} {}", outcomes.len(), kind);
        return Ok(());
    }

    for failure in &failures {
        eprintln!(
            "{}: {}",
            short_id(&failure.id),
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }
    Err(CliError::BulkDeleteFailed {
        failed: failures.len(),
        total: outcomes.len(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_payload_requires_json_object() {
        assert!(parse_payload(r#"{"value": "1.2.3.4"}"#).is_ok());
        assert!(parse_payload("[1, 2]").is_err());
        assert!(parse_payload("not json").is_err());
    }

    #[test]
    fn created_id_falls_back_when_missing() {
        assert_eq!(created_id(&json!({"id": "abc"})), "abc");
        assert_eq!(created_id(&json!({"success": true})), "?");
    }

    #[test]
    fn every_mutation_verb_builds_a_gate_prompt() {
        // One entry per mutating command; the gate runs before any request.
        let prompts = [
            gate("Create", "a new indicator".to_string(), false),
            gate("Update", "indicator 0198ab12".to_string(), false),
            gate("Deactivate", "user 0198ab12".to_string(), false),
            gate("Reactivate", "user 0198ab12".to_string(), false),
            gate("Accept", "trust relationship 0198ab12".to_string(), false),
            gate("Mark", "notification 0198ab12 as read".to_string(), false),
        ];
        for prompt in &prompts {
            assert!(!prompt.destructive);
            assert!(prompt.prompt().ends_with("? [y/N] "));
        }
    }

    #[test]
    fn only_permanent_delete_is_destructive() {
        let delete = gate("Permanently delete", "3 indicators".to_string(), true);
        assert!(delete.destructive);
        assert!(delete.prompt().starts_with("This cannot be undone."));
    }

    #[test]
    fn assume_yes_approves_without_prompting() {
        let request = gate("Update", "user 0198ab12".to_string(), false);
        assert!(approved(&request, true).unwrap());
    }
}
