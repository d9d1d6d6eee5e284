//! 3D structure viewer. Geometry and drawing happen in the browser through
//! 3Dmol.js; this module only emits the embed fragment that drives it.

use serde_json::json;

use crate::config::ViewerSettings;
use crate::error::AnalyzerError;
use crate::models::StructureView;

pub const MAX_STRUCTURE_ID_LEN: usize = 16;

pub trait StructureRenderer: Send + Sync {
    fn render(&self, structure_id: &str) -> Result<StructureView, AnalyzerError>;
}

/// Accepts classic 4-character PDB IDs and extended `pdb_0000xxxx` IDs.
/// The id ends up inside a script tag, so nothing else gets through.
pub fn validate_structure_id(structure_id: &str) -> Result<&str, AnalyzerError> {
    let id = structure_id.trim();
    let well_formed = !id.is_empty()
        && id.len() <= MAX_STRUCTURE_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if well_formed {
        Ok(id)
    } else {
        Err(AnalyzerError::InvalidStructureId(structure_id.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ThreeDmolRenderer {
    settings: ViewerSettings,
}

impl ThreeDmolRenderer {
    pub fn new(settings: ViewerSettings) -> Self {
        Self { settings }
    }
}

impl StructureRenderer for ThreeDmolRenderer {
    fn render(&self, structure_id: &str) -> Result<StructureView, AnalyzerError> {
        let id = validate_structure_id(structure_id)?;

        // protein as a spectrum-coloured cartoon, hetero atoms as ball-and-stick
        let protein_style = json!({ "cartoon": { "color": "spectrum" } });
        let ligand_selection = json!({ "hetflag": true });
        let ligand_style = json!({
            "stick": { "colorscheme": "orangeCarbon", "radius": 0.15 },
            "sphere": { "colorscheme": "orangeCarbon", "scale": 0.25 }
        });
        let element_id = format!("structure-viewer-{}", id.to_ascii_lowercase());
        let script_url = json!(self.settings.script_url);

        let html = format!(
            r#"<div id="{element_id}" class="structure-viewer" style="height: {height}px; width: 100%; position: relative;"></div>
<script>
(function () {{
  function draw() {{
    var viewer = $3Dmol.createViewer(document.getElementById("{element_id}"), {{ backgroundColor: "white" }});
    $3Dmol.download("pdb:{id}", viewer, {{}}, function () {{
      viewer.setStyle({{}}, {protein_style});
      viewer.addStyle({ligand_selection}, {ligand_style});
      viewer.zoomTo();
      viewer.render();
    }});
  }}
  if (window.$3Dmol) {{
    draw();
  }} else {{
    var script = document.createElement("script");
    script.src = {script_url};
    script.onload = draw;
    document.head.appendChild(script);
  }}
}})();
</script>"#,
            height = self.settings.height,
        );

        Ok(StructureView {
            structure_id: id.to_string(),
            html,
            height: self.settings.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> ThreeDmolRenderer {
        ThreeDmolRenderer::new(ViewerSettings::default())
    }

    #[test]
    fn test_accepts_pdb_ids() {
        assert_eq!(validate_structure_id("1M17").unwrap(), "1M17");
        assert_eq!(validate_structure_id(" 6J5T ").unwrap(), "6J5T");
        assert!(validate_structure_id("pdb_00001m17").is_ok());
    }

    #[test]
    fn test_rejects_bad_ids() {
        for bad in ["", "   ", "1M17\");alert(1)//", "6LU7 6J5T", "pdb_000000000001m17"] {
            assert!(
                matches!(validate_structure_id(bad), Err(AnalyzerError::InvalidStructureId(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_fragment_loads_structure_with_styles() {
        let view = renderer().render("6LU7").unwrap();

        assert_eq!(view.structure_id, "6LU7");
        assert_eq!(view.height, 500);
        assert!(view.html.contains(r#"$3Dmol.download("pdb:6LU7""#));
        assert!(view.html.contains(r#"{"cartoon":{"color":"spectrum"}}"#));
        assert!(view.html.contains(r#"{"hetflag":true}"#));
        assert!(view.html.contains("orangeCarbon"));
        assert!(view.html.contains(r#"id="structure-viewer-6lu7""#));
        assert!(view.html.contains(r#""https://3Dmol.org/build/3Dmol-min.js""#));
    }
}
