//! Scripted stand-in for the remote wizard.

use std::{
    cell::{Ref, RefCell},
    collections::HashMap,
    io::Write,
    path::Path,
};

use anyhow::bail;
use reqwest::StatusCode;
use url::Url;

use crate::{
    asrs::Asrs,
    fs_util,
    schema::StepRequest,
    session::{Download, FetchedPage, SessionClient},
    wizard_trait::QueryWizard,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug)]
pub struct Recorded {
    pub method: Method,
    pub url: Url,
    pub form: Option<StepRequest>,
}

#[derive(Default)]
pub struct FakeSession {
    routes: HashMap<(Method, String), (StatusCode, Vec<u8>)>,
    unreachable: bool,
    requests: RefCell<Vec<Recorded>>,
}

pub const FILTER_PAGE: &str = r#"<html><head><title>ASRS Query Wizard: Filter</title></head><body>
<form method="post" action="QueryWizard_Filter.aspx">
<input type="hidden" name="__EVENTTARGET" id="__EVENTTARGET" value="" />
<input type="hidden" name="__EVENTARGUMENT" id="__EVENTARGUMENT" value="" />
<input type="hidden" name="__VIEWSTATE" id="__VIEWSTATE" value="filter/state==" />
<input type="hidden" name="__VIEWSTATEGENERATOR" id="__VIEWSTATEGENERATOR" value="5F7E1BB2" />
<input type="hidden" name="__EVENTVALIDATION" id="__EVENTVALIDATION" value="filter-validation" />
<input type="hidden" name="hdnCurrentItems" value="1" />
<table><tr><td>Date of Incident</td><td><input type="image" name="2" id="2" src="images/add.gif" /></td></tr></table>
<input type="image" name="ImageButton1" id="ImageButton1" src="images/run.gif" alt="Perform this search and go to the Results page." />
</form></body></html>"#;

pub const FILTER_PAGE_WITH_FILTER: &str = r#"<html><head><title>ASRS Query Wizard: Filter</title></head><body>
<form method="post" action="QueryWizard_Filter.aspx">
<input type="hidden" name="__VIEWSTATE" value="filter/active==" />
<input type="hidden" name="__EVENTVALIDATION" value="active-validation" />
<input type="hidden" name="__EVENTTARGET" value="2" />
<input type="hidden" name="__EVENTARGUMENT" value="stale" />
<p>Current Search Items: Date of Incident</p>
<input type="image" name="ImageButton1" alt="Perform this search and go to the Results page." />
</form></body></html>"#;

pub const DATE_POPUP_PAGE: &str = r#"<html><head><title>Date of Incident</title></head><body>
<form method="post">
<input type="hidden" name="__VIEWSTATE" value="popup-state" />
<input type="hidden" name="__VIEWSTATEGENERATOR" value="A1B2C3D4" />
<input type="hidden" name="__EVENTVALIDATION" value="popup-validation" />
<input type="hidden" name="SaveButton" value="Save" />
<input type="hidden" name="statementId" value="2" />
<select name="DropDownList1"><option value="2023">2023</option></select>
<select name="DropDownList2"><option value="January">January</option></select>
<input type="image" name="SaveButton" src="images/save.gif" />
</form></body></html>"#;

pub const RESULTS_PAGE: &str = r#"<html><head><title>ASRS Query Wizard: Results</title></head><body>
<form method="post">
<input type="hidden" name="__VIEWSTATE" value="results-state" />
<p>Your search returned 42 ACNs.</p>
</form></body></html>"#;

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request fails before reaching a server.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// A wizard answering every step of a traversal successfully.
    pub fn asrs(export: &[u8]) -> Self {
        let filter = Asrs::filter_url().unwrap();
        let popup = Asrs::date_popup_url().unwrap();
        Self::new()
            .route(Method::Get, &filter, StatusCode::OK, FILTER_PAGE)
            .route(Method::Post, &filter, StatusCode::OK, RESULTS_PAGE)
            .route(Method::Get, &popup, StatusCode::OK, DATE_POPUP_PAGE)
            .route(Method::Post, &popup, StatusCode::OK, "<html></html>")
            .route(
                Method::Get,
                &Asrs::export_url().unwrap(),
                StatusCode::OK,
                export,
            )
    }

    pub fn route(
        mut self,
        method: Method,
        url: &Url,
        status: StatusCode,
        body: impl AsRef<[u8]>,
    ) -> Self {
        self.routes.insert(
            (method, url.as_str().to_owned()),
            (status, body.as_ref().to_vec()),
        );
        self
    }

    pub fn requests(&self) -> Ref<'_, Vec<Recorded>> {
        self.requests.borrow()
    }

    pub fn posted_forms(&self) -> Vec<StepRequest> {
        self.requests()
            .iter()
            .filter_map(|request| request.form.clone())
            .collect()
    }

    fn respond(
        &self,
        method: Method,
        url: Url,
        form: Option<&StepRequest>,
    ) -> anyhow::Result<(StatusCode, Vec<u8>)> {
        self.requests.borrow_mut().push(Recorded {
            method,
            url: url.clone(),
            form: form.cloned(),
        });
        if self.unreachable {
            bail!("error sending request for url ({url})");
        }
        Ok(self
            .routes
            .get(&(method, url.as_str().to_owned()))
            .cloned()
            .unwrap_or((StatusCode::NOT_FOUND, vec![])))
    }
}

impl SessionClient for FakeSession {
    async fn get(&self, url: Url) -> anyhow::Result<FetchedPage> {
        let (status, body) = self.respond(Method::Get, url.clone(), None)?;
        Ok(FetchedPage { status, url, body })
    }

    async fn post_form(&self, url: Url, form: &StepRequest) -> anyhow::Result<FetchedPage> {
        let (status, body) = self.respond(Method::Post, url.clone(), Some(form))?;
        Ok(FetchedPage { status, url, body })
    }

    async fn download(&self, url: Url, destination: &Path) -> anyhow::Result<Download> {
        let (status, body) = self.respond(Method::Get, url, None)?;
        if !status.is_success() {
            return Ok(Download::Rejected(status));
        }
        let mut writer = fs_util::create_writer(destination)?;
        writer.write_all(&body)?;
        writer.flush()?;
        Ok(Download::Saved {
            bytes: body.len() as u64,
        })
    }
}
