//! Vite client bundle placed under `client/`

use super::json_object;
use crate::assemble::naming::{to_kebab_case, to_upper_camel_case};
use crate::config::{Feature, Frontend, ValidConfig};

fn frontend_variant(variant: &str) -> Option<Frontend> {
    Frontend::ALL
        .into_iter()
        .find(|f| *f != Frontend::None && f.id() == variant)
}

fn component_name(config: &ValidConfig) -> String {
    format!("{}App", to_upper_camel_case(config.project_name()))
}

pub fn manifest(variant: &str, config: &ValidConfig) -> Option<String> {
    let (deps, dev_deps): (&[(&'static str, &'static str)], &[(&'static str, &'static str)]) = match frontend_variant(variant)? {
        Frontend::React => (
            &[("react", "^18.3.1"), ("react-dom", "^18.3.1")],
            &[("@vitejs/plugin-react", "^4.3.4"), ("vite", "^6.0.7")],
        ),
        Frontend::Vue => (
            &[("vue", "^3.5.13")],
            &[("@vitejs/plugin-vue", "^5.2.1"), ("vite", "^6.0.7")],
        ),
        Frontend::Svelte => (
            &[],
            &[
                ("@sveltejs/vite-plugin-svelte", "^5.0.3"),
                ("svelte", "^5.16.0"),
                ("vite", "^6.0.7"),
            ],
        ),
        Frontend::None => return None,
    };
    let owned = |pairs: &[(&'static str, &'static str)]| -> Vec<(&'static str, String)> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    };
    let scripts = [
        ("dev", "vite".to_string()),
        ("build", "vite build".to_string()),
        ("preview", "vite preview".to_string()),
    ];

    Some(format!(
        r#"{{
  "name": "{name}-client",
  "version": "0.1.0",
  "private": true,
  "type": "module",
  "scripts": {scripts},
  "dependencies": {deps},
  "devDependencies": {dev_deps}
}}
"#,
        name = to_kebab_case(config.project_name()),
        scripts = json_object(&scripts, 2),
        deps = json_object(&owned(deps), 2),
        dev_deps = json_object(&owned(dev_deps), 2),
    ))
}

pub fn index_html(variant: &str, config: &ValidConfig) -> Option<String> {
    let script = match frontend_variant(variant)? {
        Frontend::React => "/src/main.jsx",
        _ => "/src/main.js",
    };
    Some(format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{title}</title>
  </head>
  <body>
    <div id="app"></div>
    <script type="module" src="{script}"></script>
  </body>
</html>
"#,
        title = config.project_name(),
        script = script,
    ))
}

pub fn vite_config(variant: &str) -> Option<String> {
    let (import, plugin) = match frontend_variant(variant)? {
        Frontend::React => ("import react from '@vitejs/plugin-react';", "react()"),
        Frontend::Vue => ("import vue from '@vitejs/plugin-vue';", "vue()"),
        Frontend::Svelte => (
            "import { svelte } from '@sveltejs/vite-plugin-svelte';",
            "svelte()",
        ),
        Frontend::None => return None,
    };
    Some(format!(
        "import {{ defineConfig }} from 'vite';\n{}\n\nexport default defineConfig({{\n  plugins: [{}],\n  server: {{ port: 5173 }},\n}});\n",
        import, plugin
    ))
}

pub fn entry(variant: &str, config: &ValidConfig) -> Option<String> {
    let name = component_name(config);
    let body = match frontend_variant(variant)? {
        Frontend::React => format!(
            r#"import React from 'react';
import {{ createRoot }} from 'react-dom/client';
import {name} from './{name}.jsx';

createRoot(document.getElementById('app')).render(
  <React.StrictMode>
    <{name} />
  </React.StrictMode>,
);
"#,
            name = name
        ),
        Frontend::Vue => format!(
            "import {{ createApp }} from 'vue';\nimport {name} from './{name}.vue';\n\ncreateApp({name}).mount('#app');\n",
            name = name
        ),
        Frontend::Svelte => format!(
            "import {{ mount }} from 'svelte';\nimport {name} from './{name}.svelte';\n\nmount({name}, {{ target: document.getElementById('app') }});\n",
            name = name
        ),
        Frontend::None => return None,
    };
    Some(body)
}

pub fn root_component(variant: &str, config: &ValidConfig) -> Option<String> {
    let frontend = frontend_variant(variant)?;
    let auth = config.has(Feature::Auth);
    let title = config.project_name();

    let body = match frontend {
        Frontend::React => {
            let mut out = String::from(
                "import { useEffect, useState } from 'react';\nimport { api, setToken } from './lib/api.js';\n\n",
            );
            out.push_str(&format!("export default function {}() {{\n", component_name(config)));
            out.push_str(
                r#"  const [status, setStatus] = useState('checking');

  useEffect(() => {
    api('/health')
      .then((res) => setStatus(res.status))
      .catch(() => setStatus('unreachable'));
  }, []);
"#,
            );
            if auth {
                out.push_str(
                    r#"
  const [email, setEmail] = useState('');
  const [password, setPassword] = useState('');
  const [message, setMessage] = useState('');

  async function login(event) {
    event.preventDefault();
    try {
      const res = await api('/api/auth/login', { method: 'POST', body: { email, password } });
      setToken(res.token);
      setMessage(`Signed in as ${res.user.email}`);
    } catch (err) {
      setMessage(err.message);
    }
  }
"#,
                );
            }
            out.push_str(&format!(
                "\n  return (\n    <main>\n      <h1>{}</h1>\n      <p>API status: {{status}}</p>\n",
                title
            ));
            if auth {
                out.push_str(
                    r#"      <form onSubmit={login}>
        <input type="email" value={email} onChange={(e) => setEmail(e.target.value)} placeholder="Email" />
        <input type="password" value={password} onChange={(e) => setPassword(e.target.value)} placeholder="Password" />
        <button type="submit">Sign in</button>
      </form>
      <p>{message}</p>
"#,
                );
            }
            out.push_str("    </main>\n  );\n}\n");
            out
        }
        Frontend::Vue => {
            let mut out = String::from(
                "<script setup>\nimport { onMounted, ref } from 'vue';\nimport { api, setToken } from './lib/api.js';\n\nconst status = ref('checking');\n\nonMounted(async () => {\n  try {\n    status.value = (await api('/health')).status;\n  } catch {\n    status.value = 'unreachable';\n  }\n});\n",
            );
            if auth {
                out.push_str(
                    r#"
const email = ref('');
const password = ref('');
const message = ref('');

async function login() {
  try {
    const res = await api('/api/auth/login', {
      method: 'POST',
      body: { email: email.value, password: password.value },
    });
    setToken(res.token);
    message.value = `Signed in as ${res.user.email}`;
  } catch (err) {
    message.value = err.message;
  }
}
"#,
                );
            }
            out.push_str(&format!(
                "</script>\n\n<template>\n  <main>\n    <h1>{}</h1>\n    <p>API status: {{{{ status }}}}</p>\n",
                title
            ));
            if auth {
                out.push_str(
                    r#"    <form @submit.prevent="login">
      <input v-model="email" type="email" placeholder="Email" />
      <input v-model="password" type="password" placeholder="Password" />
      <button type="submit">Sign in</button>
    </form>
    <p>{{ message }}</p>
"#,
                );
            }
            out.push_str("  </main>\n</template>\n");
            out
        }
        Frontend::Svelte => {
            let mut out = String::from(
                "<script>\n  import { onMount } from 'svelte';\n  import { api, setToken } from './lib/api.js';\n\n  let status = $state('checking');\n\n  onMount(async () => {\n    try {\n      status = (await api('/health')).status;\n    } catch {\n      status = 'unreachable';\n    }\n  });\n",
            );
            if auth {
                out.push_str(
                    r#"
  let email = $state('');
  let password = $state('');
  let message = $state('');

  async function login(event) {
    event.preventDefault();
    try {
      const res = await api('/api/auth/login', { method: 'POST', body: { email, password } });
      setToken(res.token);
      message = `Signed in as ${res.user.email}`;
    } catch (err) {
      message = err.message;
    }
  }
"#,
                );
            }
            out.push_str(&format!(
                "</script>\n\n<main>\n  <h1>{}</h1>\n  <p>API status: {{status}}</p>\n",
                title
            ));
            if auth {
                out.push_str(
                    r#"  <form onsubmit={login}>
    <input type="email" bind:value={email} placeholder="Email" />
    <input type="password" bind:value={password} placeholder="Password" />
    <button type="submit">Sign in</button>
  </form>
  <p>{message}</p>
"#,
                );
            }
            out.push_str("</main>\n");
            out
        }
        Frontend::None => return None,
    };
    Some(body)
}

pub fn api_module() -> String {
    r#"const BASE_URL = import.meta.env.VITE_API_URL || 'http://localhost:3000';

let token = null;

export function setToken(value) {
  token = value;
}

export async function api(path, { method = 'GET', body } = {}) {
  const headers = { Accept: 'application/json' };
  if (body !== undefined) headers['Content-Type'] = 'application/json';
  if (token) headers.Authorization = `Bearer ${token}`;

  const res = await fetch(`${BASE_URL}${path}`, {
    method,
    headers,
    body: body === undefined ? undefined : JSON.stringify(body),
  });
  const data = await res.json().catch(() => null);
  if (!res.ok) {
    throw new Error((data && data.error) || `Request failed with status ${res.status}`);
  }
  return data;
}
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Configuration, Database, Framework};
    use crate::rules::validate;

    fn config(frontend: Frontend, features: &[Feature]) -> ValidConfig {
        validate(
            &Configuration::new("acme-api")
                .with_framework(Framework::Express)
                .with_database(Database::Sqlite)
                .with_features(features.iter().copied())
                .with_frontend(frontend),
        )
        .unwrap()
    }

    #[test]
    fn test_entry_imports_project_component() {
        let react = config(Frontend::React, &[]);
        assert!(entry("react", &react)
            .unwrap()
            .contains("import AcmeApiApp from './AcmeApiApp.jsx';"));

        let svelte = config(Frontend::Svelte, &[]);
        assert!(entry("svelte", &svelte)
            .unwrap()
            .contains("mount(AcmeApiApp, { target: document.getElementById('app') });"));
    }

    #[test]
    fn test_root_component_adds_login_with_auth() {
        let with = root_component("vue", &config(Frontend::Vue, &[Feature::Auth])).unwrap();
        assert!(with.contains("@submit.prevent=\"login\""));
        assert!(with.contains("{{ status }}"));

        let without = root_component("vue", &config(Frontend::Vue, &[])).unwrap();
        assert!(!without.contains("login"));
    }

    #[test]
    fn test_manifest_names_client_package() {
        let body = manifest("react", &config(Frontend::React, &[])).unwrap();
        assert!(body.contains("\"name\": \"acme-api-client\""));
        assert!(body.contains("\"@vitejs/plugin-react\""));
        assert!(manifest("angular", &config(Frontend::React, &[])).is_none());
    }
}
