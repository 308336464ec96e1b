//! Server-rendered chat page.

use minijinja::{context, Environment};

const TITLE: &str = "AI Chatbot";
const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Renders the page. `prompt` is echoed into the input field, `output` fills
/// the answer area when present. The `.html` name turns on auto-escaping.
pub fn render(prompt: &str, output: Option<&str>) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("index.html", INDEX_TEMPLATE)?;

    env.get_template("index.html")?.render(context! {
        title => TITLE,
        prompt => prompt,
        output => output,
    })
}
