use nikkari_manifest::MemberGroup;

/// Report lines shown before the rest is summarised.
pub const REPORT_PREVIEW_LINES: usize = 20;

pub fn render_notes(lines: &[String], limit: usize) -> String {
    let mut out = lines
        .iter()
        .take(limit)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    if lines.len() > limit {
        out.push_str(&format!("\n... ({} more)", lines.len() - limit));
    }
    out
}

pub fn render_report(changes: usize, lines: &[String]) -> String {
    let mut out = format!("Changes made: {changes}");
    if !lines.is_empty() {
        out.push_str("\n\nReport:\n");
        out.push_str(&render_notes(lines, REPORT_PREVIEW_LINES));
    }
    out
}

/// Project tree: root-level members directly under the title, other
/// members under their folder.
pub fn render_tree(title: &str, groups: &[MemberGroup]) -> String {
    let mut out = String::from(title);
    for group in groups {
        if group.label.is_empty() {
            for member in &group.members {
                out.push_str(&format!("\n  {}", member.path));
            }
            continue;
        }
        out.push_str(&format!("\n  {}/", group.label));
        for member in &group.members {
            out.push_str(&format!(
                "\n    {}",
                nikkari_manifest::paths::member_file_name(&member.path)
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nikkari_manifest::Member;

    #[test]
    fn long_reports_are_cut() {
        let lines: Vec<String> = (0..25).map(|i| format!("line {i}")).collect();
        let text = render_notes(&lines, REPORT_PREVIEW_LINES);
        assert_eq!(text.lines().count(), 21);
        assert!(text.ends_with("... (5 more)"));
    }

    #[test]
    fn tree_nests_folders() {
        let groups = vec![
            MemberGroup {
                label: "src".to_string(),
                members: vec![Member {
                    path: "src/a.c".to_string(),
                    group: "src".to_string(),
                }],
            },
            MemberGroup {
                label: String::new(),
                members: vec![Member {
                    path: "main.c".to_string(),
                    group: String::new(),
                }],
            },
        ];
        assert_eq!(render_tree("Demo", &groups), "Demo\n  src/\n    a.c\n  main.c");
    }
}
