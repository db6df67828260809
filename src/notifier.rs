use std::borrow::Cow;
use std::sync::LazyLock;

use minijinja::{context, Environment, Value as Context};
use regex::Regex;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Error;
use crate::models::TemplateSource;

// `{{.Identity}}` / `{{- .Identity }}` style field references
static FIELD_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(-?)\s*\.([A-Za-z_][A-Za-z0-9_]*)").unwrap());

/// Rewrites dotted field references into plain variable lookups, so
/// `{{.Identity}}` renders the same as `{{ Identity }}`.
fn normalize_field_refs(source: &str) -> Cow<'_, str> {
    FIELD_REF.replace_all(source, "{{$1 $2")
}

/// Render the failure message for `identity`.
///
/// A literal template is returned as-is. A structured one has each string
/// value rendered on its own with `identity` (also `Identity`) in scope, so
/// the JSON shape survives whatever the identity contains.
pub fn render_template(source: &TemplateSource, identity: &str) -> Result<String, Error> {
    match source {
        TemplateSource::Literal(text) => Ok(text.clone()),
        TemplateSource::Structured(tree) => {
            let mut env = Environment::new();
            env.set_keep_trailing_newline(true);
            let ctx = context! { identity => identity, Identity => identity };
            let rendered = render_object(&env, tree, &ctx)?;
            serde_json::to_string(&rendered).map_err(Error::InvalidNotification)
        }
    }
}

fn render_object(
    env: &Environment<'_>,
    map: &Map<String, Value>,
    ctx: &Context,
) -> Result<Map<String, Value>, Error> {
    map.iter()
        .map(|(k, v)| render_value(env, v, ctx).map(|v| (k.clone(), v)))
        .collect()
}

fn render_value(env: &Environment<'_>, value: &Value, ctx: &Context) -> Result<Value, Error> {
    Ok(match value {
        Value::String(s) => Value::String(env.render_str(&normalize_field_refs(s), ctx)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| render_value(env, v, ctx))
                .collect::<Result<_, Error>>()?,
        ),
        Value::Object(map) => Value::Object(render_object(env, map, ctx)?),
        other => other.clone(),
    })
}

/// Posts failure messages to a chat webhook.
#[derive(Clone)]
pub struct Notifier {
    client: Client,
    webhook: String,
}

impl Notifier {
    pub fn new(webhook: &str) -> Result<Self, Error> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            webhook: webhook.to_string(),
        })
    }

    /// Posts `message`, which has to be a JSON object.
    pub async fn notify(&self, message: &str) -> Result<(), Error> {
        let payload: Map<String, Value> =
            serde_json::from_str(message).map_err(Error::InvalidNotification)?;
        if self.webhook.is_empty() {
            return Err(Error::MissingWebhook);
        }

        // .json() re-serializes the payload and sets the content type
        let resp = self.client.post(&self.webhook).json(&payload).send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!("Webhook response (status {}): {}", status, text);

        if !status.is_success() {
            return Err(Error::WebhookRejected {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(())
    }
}
