//! HTML surfaces, rendered with minijinja (auto-escaped).

use axum::response::Html;
use minijinja::{context, Environment};
use serde::Serialize;

use crate::error::ApiError;

/// Template environment with every page compiled in.
pub struct Views {
    env: Environment<'static>,
}

/// Context for the login page.
#[derive(Debug, Default, Serialize)]
pub struct LoginPage {
    /// Name to pre-fill in the form.
    pub name: String,
    /// Marks the name field invalid.
    pub invalid: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl LoginPage {
    pub fn invalid(name: &str, error: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            invalid: true,
            error: Some(error.into()),
            notice: None,
        }
    }
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("layout.html", include_str!("../templates/layout.html"))?;
        env.add_template("index.html", include_str!("../templates/index.html"))?;
        env.add_template("chat.html", include_str!("../templates/chat.html"))?;
        env.add_template("search.html", include_str!("../templates/search.html"))?;
        env.add_template("error.html", include_str!("../templates/error.html"))?;
        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<Html<String>, ApiError> {
        Ok(Html(self.env.get_template(name)?.render(ctx)?))
    }

    pub fn login(&self, page: &LoginPage) -> Result<Html<String>, ApiError> {
        self.render("index.html", minijinja::Value::from_serialize(page))
    }

    pub fn chat(&self, user: &str, poll_interval_secs: u64) -> Result<Html<String>, ApiError> {
        self.render(
            "chat.html",
            context! { user => user, poll_interval_ms => poll_interval_secs.saturating_mul(1000) },
        )
    }

    pub fn search(&self) -> Result<Html<String>, ApiError> {
        self.render("search.html", context! {})
    }

    pub fn error(&self) -> Result<Html<String>, ApiError> {
        self.render("error.html", context! {})
    }
}
