use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::{debug, info, warn};
use reqwest::StatusCode;
use url::Url;

use crate::{
    document::DocumentState,
    schema::{ClickAt, DateRange, StateField, StepRequest},
    session::{Download, SessionClient},
    wizard_trait::QueryWizard,
};

const ADD_FILTER_CLICK: ClickAt = ClickAt { x: 10, y: 10 };
const SAVE_CLICK: ClickAt = ClickAt { x: 10, y: 10 };
const SEARCH_CLICK: ClickAt = ClickAt { x: 50, y: 10 };

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("{step}: the control {control:?} was not found")]
    MissingControl {
        step: &'static str,
        control: String,
    },
    #[error("{step}: the control {control:?} has no name to click")]
    UnnamedControl {
        step: &'static str,
        control: String,
    },
    #[error("Server returned {status} for {url}")]
    TransportFailure { url: Url, status: StatusCode },
    #[error("Expected to land on {expected}, but got {url}")]
    UnexpectedDocumentShape { expected: &'static str, url: Url },
}

/// Why a step could not be applied.
#[derive(Debug)]
pub enum StepFailure {
    MissingControl {
        step: &'static str,
        control: String,
    },
    UnnamedControl {
        step: &'static str,
        control: String,
    },
}
impl From<StepFailure> for WizardError {
    fn from(failure: StepFailure) -> Self {
        match failure {
            StepFailure::MissingControl { step, control } => {
                WizardError::MissingControl { step, control }
            }
            StepFailure::UnnamedControl { step, control } => {
                WizardError::UnnamedControl { step, control }
            }
        }
    }
}

#[derive(Debug)]
pub enum StepOutcome {
    Applied(DocumentState),
    /// The wizard was already in the state the step would have produced.
    AlreadySatisfied(DocumentState),
    Failed(StepFailure),
}
impl StepOutcome {
    pub fn into_state(self) -> Result<DocumentState, WizardError> {
        match self {
            StepOutcome::Applied(state) | StepOutcome::AlreadySatisfied(state) => Ok(state),
            StepOutcome::Failed(failure) => Err(failure.into()),
        }
    }
}

#[derive(Debug)]
pub enum ExportOutcome {
    Saved { path: PathBuf, bytes: u64 },
    Rejected(StatusCode),
}

/// Drives the wizard one step at a time over a single session.
pub struct WizardClient<T, C> {
    session: C,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: QueryWizard, C: SessionClient> WizardClient<T, C> {
    pub fn new(session: C) -> Self {
        Self {
            session,
            _phantom: PhantomData,
        }
    }

    pub fn session(&self) -> &C {
        &self.session
    }

    pub async fn initialize(&self) -> anyhow::Result<DocumentState> {
        info!("Initializing session...");
        let url = T::filter_url()?;
        let page = self.session.get(url.clone()).await?;
        if !page.status.is_success() {
            // The following steps decide for themselves whether the page is usable.
            warn!(
                "{}",
                WizardError::TransportFailure {
                    url,
                    status: page.status,
                }
            );
        }
        Ok(page.into())
    }

    pub async fn add_date_filter(&self, state: DocumentState) -> anyhow::Result<StepOutcome> {
        info!("Adding the date filter...");
        if state.image_button(T::DATE_FILTER_ID).is_none() {
            // There's no reliable "already added" marker,
            // so a missing add button is taken to mean the filter is active.
            info!("The add button was not found.  Assuming the filter is already active.");
            return Ok(StepOutcome::AlreadySatisfied(state));
        }

        let mut form = StepRequest::from(&state.hidden_state());
        form.set(StateField::EventTarget.name(), T::DATE_FILTER_ID)
            .click(T::DATE_FILTER_ID, ADD_FILTER_CLICK);
        let page = self.session.post_form(T::filter_url()?, &form).await?;
        Ok(StepOutcome::Applied(page.into()))
    }

    pub async fn set_date_range(&self, range: DateRange) -> anyhow::Result<DocumentState> {
        info!("Setting date range: {range}");
        let popup_url = T::date_popup_url()?;
        let popup: DocumentState = self.session.get(popup_url.clone()).await?.into();

        let form = Self::date_range_form(&popup, range);
        debug!("Date range form: {form:?}");
        let response = self.session.post_form(popup_url, &form).await?;
        if !response.status.is_success() {
            warn!(
                "Saving the date range returned {}; continuing anyway.",
                response.status
            );
        }

        // The popup only updates the server-side session; read back the filter page.
        let page = self.session.get(T::filter_url()?).await?;
        Ok(page.into())
    }

    fn date_range_form(popup: &DocumentState, range: DateRange) -> StepRequest {
        let [start_year, start_month, end_year, end_month] = T::DATE_RANGE_FIELDS;
        let mut form = StepRequest::from(&popup.hidden_state());
        form.set(start_year, range.start.year().to_string())
            .set(start_month, range.start.month().name())
            .set(end_year, range.end.year().to_string())
            .set(end_month, range.end.month().name())
            .click(T::SAVE_BUTTON, SAVE_CLICK)
            .remove(T::SAVE_BUTTON);
        form
    }

    pub async fn run_search(&self, state: DocumentState) -> anyhow::Result<StepOutcome> {
        info!("Running search...");
        let results_url = T::results_url()?;
        let Some(name) = state
            .input_with_alt(T::SEARCH_BUTTON_ALT)
            .map(|button| button.value().attr("name").map(str::to_owned))
        else {
            if state.is_results_page(&results_url) {
                info!("Already on the results page.");
                return Ok(StepOutcome::AlreadySatisfied(state));
            }
            return Ok(StepOutcome::Failed(StepFailure::MissingControl {
                step: "run_search",
                control: T::SEARCH_BUTTON_ALT.to_owned(),
            }));
        };
        let Some(name) = name.filter(|name| !name.is_empty()) else {
            return Ok(StepOutcome::Failed(StepFailure::UnnamedControl {
                step: "run_search",
                control: T::SEARCH_BUTTON_ALT.to_owned(),
            }));
        };

        let mut form = StepRequest::from(&state.hidden_state());
        form.remove(StateField::EventTarget.name())
            .remove(StateField::EventArgument.name())
            .click(&name, SEARCH_CLICK);
        let page: DocumentState = self.session.post_form(T::filter_url()?, &form).await?.into();
        if !page.is_results_page(&results_url) {
            // Sometimes it redirects, sometimes it just renders; don't block on it.
            warn!(
                "{}",
                WizardError::UnexpectedDocumentShape {
                    expected: T::RESULTS_URL,
                    url: page.url().clone(),
                }
            );
        }
        Ok(StepOutcome::Applied(page))
    }

    /// The export endpoint only depends on the session, not on the page state.
    pub async fn export_result(&self, destination: &Path) -> anyhow::Result<ExportOutcome> {
        info!("Downloading {}...", T::EXPORT_TYPE);
        let url = T::export_url()?;
        let download = self
            .session
            .download(url, destination)
            .await
            .with_context(|| format!("While exporting to {destination:?}"))?;
        Ok(match download {
            Download::Saved { bytes } => {
                info!("Saved to {destination:?} ({bytes} bytes)");
                ExportOutcome::Saved {
                    path: destination.to_owned(),
                    bytes,
                }
            }
            Download::Rejected(status) => {
                warn!("Failed to download.  Status: {status}");
                ExportOutcome::Rejected(status)
            }
        })
    }
}
