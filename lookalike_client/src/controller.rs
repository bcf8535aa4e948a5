use tokio::{sync::watch, task::JoinHandle};
use tracing::{error, info, warn};

use crate::{
    intake::{FileIntake, IntakeSource},
    render::ResultsRenderer,
    search::{SearchClient, SearchRequest},
};

pub const MISSING_FIELDS_ALERT: &str = "Please fill in all the fields and upload an image.";
pub const SEARCH_FAILED_ALERT: &str = "Failed to process image. Please try again.";

/// State of the submit action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SubmitState {
    Idle { enabled: bool },
    Submitting,
}

/// What the page shows around the form: the loader and the submit action.
/// Published on a watch channel so it can be observed mid-search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageState {
    pub loading: bool,
    pub submit: SubmitState,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            loading: false,
            submit: SubmitState::Idle { enabled: false },
        }
    }
}

/// How a submission ended. Every variant leaves the page idle again.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Results were drawn with this many cards.
    Rendered(usize),
    /// The response arrived but its results couldn't be drawn.
    Malformed,
    /// The request failed and the user was alerted.
    Failed,
    /// Required inputs were missing so nothing was sent.
    Incomplete,
}

/// Wires file intake, the search client, and the results renderer
/// together behind the form.
pub struct PageController {
    intake: FileIntake,
    client: SearchClient,
    renderer: ResultsRenderer,
    garment_type: String,
    garment_layer: String,
    page: watch::Sender<PageState>,
    alerts: Vec<String>,
}

impl PageController {
    pub fn new(intake: FileIntake, client: SearchClient, renderer: ResultsRenderer) -> Self {
        let mut controller = Self {
            intake,
            client,
            renderer,
            garment_type: String::new(),
            garment_layer: String::new(),
            page: watch::Sender::new(PageState::default()),
            alerts: vec![],
        };
        controller.refresh_submit_state();
        controller
    }

    pub fn can_search(&self) -> bool {
        self.intake.has_selected_file()
            && !self.garment_type.trim().is_empty()
            && !self.garment_layer.trim().is_empty()
    }

    fn refresh_submit_state(&mut self) {
        let enabled = self.can_search();
        self.page.send_modify(|page| {
            if let SubmitState::Idle { .. } = page.submit {
                page.submit = SubmitState::Idle { enabled };
            }
        });
    }

    /// Watch the loader and submit action as they change.
    pub fn subscribe(&self) -> watch::Receiver<PageState> {
        self.page.subscribe()
    }

    pub fn select_file(&mut self, source: IntakeSource) -> Option<JoinHandle<()>> {
        let handle = self.intake.select_file(source);
        self.refresh_submit_state();
        handle
    }

    pub fn set_garment_type(&mut self, value: impl Into<String>) {
        self.garment_type = value.into();
        self.refresh_submit_state();
    }

    pub fn set_garment_layer(&mut self, value: impl Into<String>) {
        self.garment_layer = value.into();
        self.refresh_submit_state();
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    /// Run one search with the current inputs. Inputs are checked again
    /// here in case the submit action was left enabled. Whatever happens,
    /// the loader is hidden and the submit action re-enabled afterwards.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let file = self.intake.get_selected_file();
        let (Some(file), false, false) = (
            file,
            self.garment_type.trim().is_empty(),
            self.garment_layer.trim().is_empty(),
        ) else {
            warn!("submit attempted with missing inputs");
            self.alert(MISSING_FIELDS_ALERT);
            return SubmitOutcome::Incomplete;
        };

        let request = SearchRequest::builder()
            .file(file)
            .garment_type(self.garment_type.clone())
            .garment_layer(self.garment_layer.clone())
            .build();

        self.page.send_modify(|page| page.loading = true);
        self.renderer.clear();
        self.page.send_modify(|page| page.submit = SubmitState::Submitting);

        let outcome = match self.client.submit(request).await {
            Ok(response) => {
                if self.renderer.display(&response) {
                    let cards = self.renderer.view().cards.len();
                    info!(cards, "search finished");
                    SubmitOutcome::Rendered(cards)
                } else {
                    SubmitOutcome::Malformed
                }
            }
            Err(err) => {
                error!("search failed: {err}");
                self.alert(SEARCH_FAILED_ALERT);
                SubmitOutcome::Failed
            }
        };

        self.page.send_modify(|page| {
            page.loading = false;
            page.submit = SubmitState::Idle { enabled: true };
        });
        self.refresh_submit_state();
        outcome
    }

    pub fn clear_results(&mut self) {
        self.renderer.clear();
    }

    /// Drain alerts raised since the last call.
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn submit_state(&self) -> SubmitState {
        self.page.borrow().submit
    }

    pub fn is_loading(&self) -> bool {
        self.page.borrow().loading
    }

    pub fn garment_type(&self) -> &str {
        &self.garment_type
    }

    pub fn garment_layer(&self) -> &str {
        &self.garment_layer
    }

    pub fn intake(&self) -> &FileIntake {
        &self.intake
    }

    pub fn renderer(&self) -> &ResultsRenderer {
        &self.renderer
    }

    pub fn client(&self) -> &SearchClient {
        &self.client
    }
}
