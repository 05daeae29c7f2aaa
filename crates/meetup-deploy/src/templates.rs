//! Config file templates rendered on the operator's machine.

use handlebars::Handlebars;
use serde::Serialize;

use crate::Result;

const BOT_ENV: &str = "bot_env";
const BOT_SERVICE: &str = "bot_service";
const NGINX_SITE: &str = "nginx_site";
const SSL_PARAMS: &str = "ssl_params";

/// Registry of the bundled templates.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);

        registry.register_template_string(BOT_ENV, include_str!("../templates/bot.env.hbs"))?;
        registry
            .register_template_string(BOT_SERVICE, include_str!("../templates/bot.service.hbs"))?;
        registry
            .register_template_string(NGINX_SITE, include_str!("../templates/nginx_site.hbs"))?;
        registry
            .register_template_string(SSL_PARAMS, include_str!("../templates/ssl_params.hbs"))?;

        Ok(Self { registry })
    }

    /// Environment file read by the systemd unit.
    pub fn bot_env<T: Serialize>(&self, vars: &T) -> Result<String> {
        Ok(self.registry.render(BOT_ENV, vars)?)
    }

    pub fn bot_service(&self, ctx: &ServiceContext<'_>) -> Result<String> {
        Ok(self.registry.render(BOT_SERVICE, ctx)?)
    }

    pub fn nginx_site(&self, ctx: &NginxContext<'_>) -> Result<String> {
        Ok(self.registry.render(NGINX_SITE, ctx)?)
    }

    pub fn ssl_params(&self, dhparam_path: &str) -> Result<String> {
        Ok(self
            .registry
            .render(SSL_PARAMS, &serde_json::json!({ "dhparam_path": dhparam_path }))?)
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceContext<'a> {
    pub user: &'a str,
    pub work_dir: &'a str,
    pub env_file_path: &'a str,
    pub binary_path: &'a str,
    pub log_path: &'a str,
}

#[derive(Debug, Serialize)]
pub struct NginxContext<'a> {
    pub domain: &'a str,
    pub fullchain_path: &'a str,
    pub privkey_path: &'a str,
    pub ssl_params_path: &'a str,
    pub log_path: &'a str,
    pub bot_port: u16,
}
