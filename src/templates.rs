// src/templates.rs
use axum::response::Html;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::AppResult;

pub const INDEX: &str = "polls/index.html";
pub const DETAIL: &str = "polls/detail.html";
pub const RESULTS: &str = "polls/results.html";

/// Templates are compiled into the binary so deployments need only the
/// static asset directory.
pub fn engine() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("polls/base.html", include_str!("../templates/polls/base.html")),
        (INDEX, include_str!("../templates/polls/index.html")),
        (DETAIL, include_str!("../templates/polls/detail.html")),
        (RESULTS, include_str!("../templates/polls/results.html")),
    ])?;
    Ok(tera)
}

pub fn render<T: Serialize>(tera: &Tera, name: &str, context: &T) -> AppResult<Html<String>> {
    let context = Context::from_serialize(context)?;
    Ok(Html(tera.render(name, &context)?))
}
