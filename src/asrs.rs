use crate::wizard_trait::QueryWizard;

// Using this to share the base among the page urls
macro_rules! asrs_url {
    ($page: literal) => {
        concat!("https://akama.arc.nasa.gov/ASRSDBOnline/", $page)
    };
}

/// NASA Aviation Safety Reporting System online database.
pub struct Asrs;
impl QueryWizard for Asrs {
    const FILTER_URL: &'static str = asrs_url!("QueryWizard_Filter.aspx");
    const RESULTS_URL: &'static str = asrs_url!("QueryWizard_Results.aspx");
    const EXPORT_URL: &'static str = asrs_url!("QueryWizard_ExportExcel.aspx");
    const DATE_POPUP_URL: &'static str = asrs_url!("QueryWizard_DatePopup.aspx");

    // "Date of Incident"
    const DATE_FILTER_ID: &'static str = "2";
    const STATEMENT_TYPE: &'static str = "Filter";
    const SEARCH_BUTTON_ALT: &'static str = "Perform this search and go to the Results page.";
    const SAVE_BUTTON: &'static str = "SaveButton";
    const DATE_RANGE_FIELDS: [&'static str; 4] = [
        "DropDownList1",
        "DropDownList2",
        "DropDownList3",
        "DropDownList4",
    ];
    const EXPORT_TYPE: &'static str = "CSV";

    const EXPORT_FILE_PREFIX: &'static str = "asrs";
    const EXPORT_FILE_EXTENSION: &'static str = "csv";
    const USER_AGENT: &'static str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
}
