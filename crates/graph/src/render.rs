//! Standalone interactive HTML rendering of a graph artifact.
//!
//! The page loads vis-network from a CDN and embeds the vertices, edges and
//! layout options as JSON.

use crate::builder::GraphArtifact;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const VIS_NETWORK_CDN: &str =
    "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// CSS height of the canvas
    pub height: String,
    /// CSS width of the canvas
    pub width: String,
    pub bgcolor: String,
    pub font_color: String,
    /// Show a drop-down that restricts the view to one node group
    pub filter_menu: bool,
    /// Draw arrow heads on edges
    pub directed: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            height: "1200px".to_string(),
            width: "100%".to_string(),
            bgcolor: "#222222".to_string(),
            font_color: "white".to_string(),
            filter_menu: true,
            directed: true,
        }
    }
}

pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn render(artifact: &GraphArtifact, options: &RenderOptions) -> String {
        let nodes: Vec<Value> = artifact
            .vertices()
            .map(|v| {
                json!({
                    "id": v.id,
                    "label": v.label,
                    "title": v.title,
                    "group": v.group,
                })
            })
            .collect();

        let edges: Vec<Value> = artifact
            .edges()
            .map(|e| {
                let mut edge = json!({
                    "from": e.source,
                    "to": e.target,
                    "label": e.label,
                });
                if options.directed {
                    edge["arrows"] = json!("to");
                }
                edge
            })
            .collect();

        let mut network_options = artifact.layout().to_vis_options();
        network_options["nodes"] = json!({
            "shape": "dot",
            "font": { "color": options.font_color },
        });
        network_options["edges"] = json!({
            "font": { "color": options.font_color, "strokeWidth": 0 },
            "smooth": { "type": "dynamic" },
        });

        let filter = if options.filter_menu {
            filter_menu_html(artifact)
        } else {
            String::new()
        };

        fill_template(
            PAGE_TEMPLATE,
            &[
                ("VIS_SRC", VIS_NETWORK_CDN.to_string()),
                ("HEIGHT", escape_html(&options.height)),
                ("WIDTH", escape_html(&options.width)),
                ("BGCOLOR", escape_html(&options.bgcolor)),
                ("FONT_COLOR", escape_html(&options.font_color)),
                ("FILTER_MENU", filter),
                ("NODES", script_json(&Value::Array(nodes))),
                ("EDGES", script_json(&Value::Array(edges))),
                ("OPTIONS", script_json(&network_options)),
            ],
        )
    }
}

/// Substitute `{{KEY}}` placeholders in one pass; substituted values are
/// never scanned again.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

fn filter_menu_html(artifact: &GraphArtifact) -> String {
    let mut html = String::from(
        "<div id=\"filter-menu\"><label for=\"group-filter\">Filter by type </label>\
         <select id=\"group-filter\"><option value=\"\">All</option>",
    );
    for group in artifact.groups() {
        let group = escape_html(group);
        html.push_str(&format!("<option value=\"{group}\">{group}</option>"));
    }
    html.push_str("</select></div>");
    html
}

/// JSON that is safe inside a `<script>` element: `<`, `>` and `&` only
/// occur inside JSON strings, where unicode escapes are equivalent.
fn script_json(value: &Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Knowledge Graph</title>
<script src="{{VIS_SRC}}"></script>
<style>
  body { margin: 0; background-color: {{BGCOLOR}}; color: {{FONT_COLOR}}; font-family: sans-serif; }
  #filter-menu { padding: 8px; }
  #graph { width: {{WIDTH}}; height: {{HEIGHT}}; background-color: {{BGCOLOR}}; }
</style>
</head>
<body>
{{FILTER_MENU}}
<div id="graph"></div>
<script>
  var nodes = new vis.DataSet({{NODES}});
  var edges = new vis.DataSet({{EDGES}});
  var options = {{OPTIONS}};
  var network = new vis.Network(
    document.getElementById("graph"),
    { nodes: nodes, edges: edges },
    options
  );

  var filter = document.getElementById("group-filter");
  if (filter) {
    filter.addEventListener("change", function () {
      var group = filter.value;
      nodes.update(nodes.get().map(function (node) {
        return { id: node.id, hidden: group !== "" && node.group !== group };
      }));
    });
  }
</script>
</body>
</html>
"#;
