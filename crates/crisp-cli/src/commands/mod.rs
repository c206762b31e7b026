mod auth_cmd;
mod common;
mod completions;
mod config_cmd;
mod list_cmd;
mod mutate;
mod watch;

pub use auth_cmd::{run_login, run_logout, run_status};
pub use common::build_context;
pub use completions::run_completions;
pub use config_cmd::{run_config_init, run_config_show, InitOptions};
pub use list_cmd::{run_list, run_show};
pub use mutate::{
    run_create, run_deactivate, run_delete, run_mark_read, run_reactivate, run_respond, run_update,
};
pub use watch::run_watch;
