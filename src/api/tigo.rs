//! [Tigo Energy Intelligence](https://ei.tigoenergy.com) cloud client.
//!
//! The cloud has no public API: the session is obtained by scraping the login page, and the data
//! comes from the same JSON endpoints the web dashboard uses.

mod endpoint;
mod error;
#[cfg(test)]
pub mod fake;
mod login;
mod models;
mod portal;
mod transport;

pub use self::{
    endpoint::{BarView, Endpoint, LastValueField, ObjectTypeId},
    error::{AuthError, FetchError},
    login::{LoginForm, SESSION_COOKIE_NAME, extract_csrf_token},
    models::{
        AggregateEnergy,
        BarChart,
        Dataset,
        InstantMetrics,
        LastValue,
        Lifetime,
        SiteDescriptor,
        SystemObject,
    },
    portal::Portal,
    transport::{AuthHeader, LoginReply, Reply, SessionCookie, Transport},
};
