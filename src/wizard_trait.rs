use serde::Serialize;
use url::Url;

/// Fixed identifiers of a remote query wizard.
///
/// The wizard is an ASP.NET page flow, so every constant here is part of its
/// wire protocol and must be reproduced exactly.
pub trait QueryWizard {
    const FILTER_URL: &'static str;
    const RESULTS_URL: &'static str;
    const EXPORT_URL: &'static str;
    const DATE_POPUP_URL: &'static str;

    /// Name (and postback target) of the image button adding the date filter.
    const DATE_FILTER_ID: &'static str;
    const STATEMENT_TYPE: &'static str;
    /// `alt` text of the button that runs the search.
    const SEARCH_BUTTON_ALT: &'static str;
    const SAVE_BUTTON: &'static str;
    /// Start year, start month, end year, end month.
    const DATE_RANGE_FIELDS: [&'static str; 4];
    const EXPORT_TYPE: &'static str;

    const EXPORT_FILE_PREFIX: &'static str;
    const EXPORT_FILE_EXTENSION: &'static str;
    const USER_AGENT: &'static str;

    fn filter_url() -> anyhow::Result<Url> {
        Ok(Url::parse(Self::FILTER_URL)?)
    }

    fn results_url() -> anyhow::Result<Url> {
        Ok(Url::parse(Self::RESULTS_URL)?)
    }

    /// The popup is normally opened by a "click here" link;
    /// we address it directly since the statement id is known.
    fn date_popup_url() -> anyhow::Result<Url> {
        #[derive(Serialize)]
        struct PopupQuery<'a> {
            #[serde(rename = "statementId")]
            statement_id: &'a str,
            #[serde(rename = "statementType")]
            statement_type: &'a str,
        }
        let mut url = Url::parse(Self::DATE_POPUP_URL)?;
        url.set_query(Some(&serde_html_form::to_string(&PopupQuery {
            statement_id: Self::DATE_FILTER_ID,
            statement_type: Self::STATEMENT_TYPE,
        })?));
        Ok(url)
    }

    fn export_url() -> anyhow::Result<Url> {
        #[derive(Serialize)]
        struct ExportQuery<'a> {
            #[serde(rename = "ExportType")]
            export_type: &'a str,
        }
        let mut url = Url::parse(Self::EXPORT_URL)?;
        url.set_query(Some(&serde_html_form::to_string(&ExportQuery {
            export_type: Self::EXPORT_TYPE,
        })?));
        Ok(url)
    }
}
