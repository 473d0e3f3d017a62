//! Page templates.
//!
//! The default set is compiled into the binary. When a templates directory
//! is configured, any file in it with a known template name replaces the
//! embedded version; missing files fall back to the defaults.

use std::path::Path;

use mf_site::ViewModel;
use minijinja::{Environment, UndefinedBehavior};

use crate::error::TemplateError;

/// Embedded default templates, by file name.
const EMBEDDED: [(&str, &str); 5] = [
    ("base.html", include_str!("../templates/base.html")),
    ("navigation.html", include_str!("../templates/navigation.html")),
    ("welcome.html", include_str!("../templates/welcome.html")),
    ("productDetail.html", include_str!("../templates/productDetail.html")),
    ("productList.html", include_str!("../templates/productList.html")),
];

/// Compiled template set.
pub(crate) struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Compile the template set, applying overrides from `dir`.
    pub(crate) fn load(dir: Option<&Path>) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        // Node fields vary by schema; a missing field renders empty
        env.set_undefined_behavior(UndefinedBehavior::Chainable);

        for (name, embedded) in EMBEDDED {
            let source = match dir.map(|d| d.join(name)) {
                Some(path) if path.is_file() => {
                    tracing::debug!(path = %path.display(), "Using template override");
                    std::fs::read_to_string(&path)
                        .map_err(|source| TemplateError::Read { path, source })?
                }
                _ => embedded.to_owned(),
            };
            env.add_template_owned(name, source)
                .map_err(|source| TemplateError::Syntax {
                    name: name.to_owned(),
                    source,
                })?;
        }

        Ok(Self { env })
    }

    /// Render `view` with its page template.
    pub(crate) fn render(&self, view: &ViewModel) -> Result<String, minijinja::Error> {
        self.env
            .get_template(view.template().file_name())?
            .render(view)
    }
}
