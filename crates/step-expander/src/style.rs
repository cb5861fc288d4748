//! Style block synthesis.

use step_core::StepConfig;

/// CSS for containers, images and arrows, derived from the config.
pub fn stylesheet(config: &StepConfig) -> String {
    let container = &config.container_class;
    let img = &config.img_class;
    let arrow = &config.arrow_class;
    let color = &config.arrow_color;

    [
        format!(
            ".{container}{{display:flex;align-items:center;gap:{gap};flex-wrap:wrap;margin:1rem 0;box-sizing:border-box;width:100%}}",
            gap = config.gap
        ),
        format!(
            ".{img}{{width:{w};height:{h};object-fit:cover;border-radius:6px;border:1px solid #e5e7eb;box-sizing:border-box;transition:all .2s ease}}",
            w = config.img_width,
            h = config.img_height
        ),
        format!(".{img}:hover{{border-color:{color};transform:scale(1.02)}}"),
        format!(
            ".{arrow}{{font-size:18px;color:{color};font-weight:600;line-height:1;user-select:none;margin:0 2px}}"
        ),
        format!(
            "@media (max-width:480px){{.{container}{{gap:8px}}.{img}{{width:70px;height:70px}}.{arrow}{{font-size:16px}}}}"
        ),
        format!("@media (min-width:481px) and (max-width:768px){{.{img}{{width:85px;height:85px}}}}"),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use step_core::StepConfigOverrides;

    use super::*;

    #[test]
    fn test_defaults() {
        let css = stylesheet(StepConfig::defaults());
        assert!(css.starts_with(".mk-step-container{display:flex;"));
        assert!(css.contains("gap:12px"));
        assert!(css.contains(".mk-step-img{width:100px;height:100px;"));
        assert!(css.contains(".mk-step-arrow{font-size:18px;color:#2563eb;"));
        assert!(css.contains("@media (max-width:480px)"));
    }

    #[test]
    fn test_selectors_follow_class_names() {
        let overrides = StepConfigOverrides::default()
            .with_container_class("row")
            .with_arrow_color("tomato");
        let config = StepConfig::from_overrides(&overrides).unwrap();
        let css = stylesheet(&config);

        assert!(css.contains(".row{display:flex"));
        assert!(css.contains(".row{gap:8px}"));
        assert!(!css.contains("mk-step-container"));
        assert!(css.contains("border-color:tomato"));
    }
}
