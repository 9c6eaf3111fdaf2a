use crate::config::TemplateSet;
use crate::models::{Caption, Panel};

pub const TOKEN_TOTAL_PANELS: &str = "{totalPanels}";
pub const TOKEN_FULL_STORY: &str = "{fullStory}";
pub const TOKEN_PANEL_NUMBER: &str = "{panelNumber}";
pub const TOKEN_PREVIOUS_PANEL: &str = "{previousPanel}";
pub const TOKEN_PREVIOUS_CAPTION: &str = "{previousCaption}";

const STORY_SEPARATOR: &str = " → ";

/// Builds the full prompt for one panel by layering the optional
/// narrative sections onto the base instruction. Pure: same inputs,
/// same output.
///
/// Section order is fixed: base, story context, positional narrative,
/// visual continuity, impact. Each non-empty section is preceded by a
/// blank line. No section's presence depends on another section's
/// content. `previous_panel` must be the immediately preceding panel
/// and only if it succeeded; the pipeline passes None after a failure.
pub fn compose(
    caption: &Caption,
    all_captions: &[Caption],
    templates: &TemplateSet,
    previous_panel: Option<&Panel>,
    prompt_prefix: &str,
) -> String {
    let position = caption.position;
    let total = all_captions.len();

    let mut prompt = format!("{} {}", prompt_prefix, caption.text);

    if !templates.story_context.trim().is_empty() {
        let full_story = all_captions
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(STORY_SEPARATOR);
        let section = substitute(
            &templates.story_context,
            &[
                (TOKEN_TOTAL_PANELS, &total.to_string()),
                (TOKEN_FULL_STORY, &full_story),
                (TOKEN_PANEL_NUMBER, &position.to_string()),
            ],
        );
        push_section(&mut prompt, &section);
    }

    // Opening is checked before final, so a one-panel story gets the
    // opening template.
    let positional = if position == 1 {
        &templates.opening_panel
    } else if position == total {
        &templates.final_panel
    } else {
        &templates.middle_panel
    };
    push_section(&mut prompt, positional);

    if position > 1 && !templates.visual_continuity.trim().is_empty() {
        if let Some(previous) = previous_panel {
            let section = substitute(
                &templates.visual_continuity,
                &[
                    (TOKEN_PREVIOUS_PANEL, &(position - 1).to_string()),
                    (TOKEN_PREVIOUS_CAPTION, &previous.caption),
                ],
            );
            push_section(&mut prompt, &section);
        }
    }

    push_section(&mut prompt, &templates.impact);

    prompt
}

fn push_section(prompt: &mut String, section: &str) {
    if !section.trim().is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(section);
    }
}

/// Literal replacement of recognized tokens. Anything that is not a
/// listed token stays in the template untouched.
fn substitute(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (token, value) in replacements {
        result = result.replace(token, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_captions, PanelStatus};

    fn captions(n: usize) -> Vec<Caption> {
        (1..=n)
            .map(|i| Caption::new(format!("caption {}", i), i))
            .collect()
    }

    fn succeeded_panel(position: usize, caption: &str) -> Panel {
        Panel {
            position,
            caption: caption.to_string(),
            status: PanelStatus::Succeeded { image: vec![0u8] },
        }
    }

    #[test]
    fn test_base_prompt_always_present() {
        let all = captions(2);
        let prompt = compose(&all[0], &all, &TemplateSet::empty(), None, "Draw:");
        assert_eq!(prompt, "Draw: caption 1");
    }

    #[test]
    fn test_opening_template_selected_for_position_one() {
        let all = captions(3);
        let templates = TemplateSet {
            opening_panel: "OPENING".into(),
            middle_panel: "MIDDLE".into(),
            final_panel: "FINAL".into(),
            ..TemplateSet::empty()
        };

        let prompt = compose(&all[0], &all, &templates, None, "Draw:");
        assert!(prompt.contains("OPENING"));
        assert!(!prompt.contains("MIDDLE"));
        assert!(!prompt.contains("FINAL"));
    }

    #[test]
    fn test_final_template_selected_for_last_position() {
        let all = captions(3);
        let templates = TemplateSet {
            opening_panel: "OPENING".into(),
            middle_panel: "MIDDLE".into(),
            final_panel: "FINAL".into(),
            ..TemplateSet::empty()
        };

        let prompt = compose(&all[2], &all, &templates, None, "Draw:");
        assert!(prompt.contains("FINAL"));
        assert!(!prompt.contains("OPENING"));
        assert!(!prompt.contains("MIDDLE"));
    }

    #[test]
    fn test_single_panel_opening_wins_over_final() {
        let all = captions(1);
        let templates = TemplateSet {
            opening_panel: "OPENING".into(),
            final_panel: "FINAL".into(),
            ..TemplateSet::empty()
        };

        let prompt = compose(&all[0], &all, &templates, None, "Draw:");
        assert!(prompt.contains("OPENING"));
        assert!(!prompt.contains("FINAL"));
    }

    #[test]
    fn test_blank_selected_template_contributes_nothing() {
        let all = captions(3);
        let templates = TemplateSet {
            opening_panel: "  ".into(),
            middle_panel: "MIDDLE".into(),
            final_panel: "FINAL".into(),
            ..TemplateSet::empty()
        };

        // Blank opening slot never falls back to middle or final.
        let prompt = compose(&all[0], &all, &templates, None, "Draw:");
        assert_eq!(prompt, "Draw: caption 1");
    }

    #[test]
    fn test_story_context_placeholders() {
        let all = parse_captions("A\nB\nC");
        let templates = TemplateSet {
            story_context: "Panel {panelNumber} of {totalPanels}: {fullStory}".into(),
            ..TemplateSet::empty()
        };

        let prompt = compose(&all[1], &all, &templates, None, "Draw:");
        assert!(prompt.contains("Panel 2 of 3: A → B → C"));
        assert!(!prompt.contains("{totalPanels}"));
        assert!(!prompt.contains("{fullStory}"));
        assert!(!prompt.contains("{panelNumber}"));
    }

    #[test]
    fn test_continuity_requires_previous_success() {
        let all = captions(3);
        let templates = TemplateSet {
            visual_continuity: "Match panel {previousPanel}: {previousCaption}".into(),
            ..TemplateSet::empty()
        };

        // No previous panel supplied: the section is omitted.
        let without = compose(&all[2], &all, &templates, None, "Draw:");
        assert!(!without.contains("Match panel"));

        let previous = succeeded_panel(2, "caption 2");
        let with = compose(&all[2], &all, &templates, Some(&previous), "Draw:");
        assert!(with.contains("Match panel 2: caption 2"));
    }

    #[test]
    fn test_continuity_never_on_first_panel() {
        let all = captions(2);
        let templates = TemplateSet {
            visual_continuity: "CONTINUITY".into(),
            ..TemplateSet::empty()
        };

        let previous = succeeded_panel(1, "caption 1");
        let prompt = compose(&all[0], &all, &templates, Some(&previous), "Draw:");
        assert!(!prompt.contains("CONTINUITY"));
    }

    #[test]
    fn test_impact_appended_last() {
        let all = captions(2);
        let templates = TemplateSet {
            opening_panel: "OPENING".into(),
            impact: "IMPACT".into(),
            ..TemplateSet::empty()
        };

        let prompt = compose(&all[0], &all, &templates, None, "Draw:");
        let opening_at = prompt.find("OPENING").unwrap();
        let impact_at = prompt.find("IMPACT").unwrap();
        assert!(impact_at > opening_at);
        assert!(prompt.ends_with("IMPACT"));
    }

    #[test]
    fn test_sections_separated_by_blank_lines() {
        let all = captions(1);
        let templates = TemplateSet {
            opening_panel: "OPENING".into(),
            impact: "IMPACT".into(),
            ..TemplateSet::empty()
        };

        let prompt = compose(&all[0], &all, &templates, None, "Draw:");
        assert_eq!(prompt, "Draw: caption 1\n\nOPENING\n\nIMPACT");
    }

    #[test]
    fn test_unrecognized_placeholders_left_untouched() {
        let all = captions(1);
        let templates = TemplateSet {
            story_context: "Total {totalPanels}, keep {artStyle} as-is".into(),
            ..TemplateSet::empty()
        };

        let prompt = compose(&all[0], &all, &templates, None, "Draw:");
        assert!(prompt.contains("Total 1, keep {artStyle} as-is"));
    }

    #[test]
    fn test_substitution_is_idempotent_for_disjoint_tokens() {
        let once = substitute(
            "{totalPanels} {fullStory} {panelNumber}",
            &[
                (TOKEN_TOTAL_PANELS, "3"),
                (TOKEN_FULL_STORY, "A → B → C"),
                (TOKEN_PANEL_NUMBER, "2"),
            ],
        );
        assert_eq!(once, "3 A → B → C 2");

        let twice = substitute(
            &once,
            &[
                (TOKEN_TOTAL_PANELS, "3"),
                (TOKEN_FULL_STORY, "A → B → C"),
                (TOKEN_PANEL_NUMBER, "2"),
            ],
        );
        assert_eq!(twice, once);
    }
}
