//! Universal module wrapper around the manifest data.

/// Wrap a data literal in a loader that picks its export style when it is evaluated.
///
/// CommonJS, AMD, a named export on an `exports` object and a global on `window` (or
/// `this`) are tried in that order by the consuming environment.
pub fn wrap_umd(global_name: &str, data: &str) -> String {
  let name = quote(global_name);
  format!(
    r#"
(function (root, factory) {{
  if (typeof exports === 'object' && typeof module === 'object') {{
    module.exports = factory();
  }} else if (typeof define === 'function' && define.amd) {{
    define([], factory);
  }} else if (typeof exports === 'object') {{
    exports[{name}] = factory();
  }} else {{
    root[{name}] = factory();
  }}
}})(typeof window !== 'undefined' ? window : this, function () {{
  // assets manifest
  return {data};
}});
"#
  )
}

fn quote(value: &str) -> String {
  serde_json::Value::String(value.to_string()).to_string()
}
