use server_api::WorkflowContext;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) workflow: WorkflowContext,
}
