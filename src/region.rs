//! Query endpoints per deployment region

pub const QUERY_PATH: &str = "/api/v1/dataprime/query";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Region {
    Eu1,
    Eu2,
    Us1,
    Us2,
    Ap1,
    Ap2,
    Ap3,
}

impl Region {
    pub fn host(self) -> &'static str {
        match self {
            Region::Eu1 => "ng-api-http.coralogix.com",
            Region::Eu2 => "ng-api-http.eu2.coralogix.com",
            Region::Us1 => "ng-api-http.coralogix.us",
            Region::Us2 => "ng-api-http.cx498.coralogix.com",
            Region::Ap1 => "ng-api-http.app.coralogix.in",
            Region::Ap2 => "ng-api-http.coralogixsg.com",
            Region::Ap3 => "ng-api-http.ap3.coralogix.com",
        }
    }

    pub fn query_url(self) -> String {
        format!("https://{}{}", self.host(), QUERY_PATH)
    }
}
