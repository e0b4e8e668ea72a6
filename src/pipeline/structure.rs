//! Structure detection: infer Markdown heading levels from bare OCR lines.
//!
//! The classifier is a fixed, ordered table of [`HeadingRule`]s evaluated by
//! a single first-match-wins loop. Rule order is the tie-break policy: a
//! short all-caps line is always a level-1 heading, even when it also starts
//! like a numbered item.
//!
//! | # | Rule | Level |
//! |---|------|-------|
//! | 1 | all upper-case, 5–78 chars, at least one upper-case letter | 1 |
//! | 2 | roman numeral I–XV followed by `.`, whitespace or a dash | 2 |
//! | 3 | `Article <n>` (any case) | 2 |
//! | 4 | `1.`/`12/` + whitespace + capital, < 100 chars | 2 |
//! | 5 | `1-`/`12 –` + whitespace + capital, < 100 chars | 2 |
//! | 6 | `a.`/`B)` + whitespace, < 100 chars | 3 |
//!
//! Blank lines and lines that already carry a heading marker pass through
//! unchanged, so running the detector on its own output is a no-op.

use crate::output::{StructureStats, StructuredDocument};
use once_cell::sync::Lazy;
use regex::Regex;

/// A single heading heuristic.
#[derive(Debug, Clone, Copy)]
pub struct HeadingRule {
    pub name: &'static str,
    /// Number of `#` markers to prepend.
    pub level: usize,
    matches: fn(&str) -> bool,
}

impl HeadingRule {
    /// Whether the rule applies to an already-trimmed line.
    pub fn matches(&self, line: &str) -> bool {
        (self.matches)(line)
    }
}

/// Heading rules in priority order.
pub const HEADING_RULES: &[HeadingRule] = &[
    HeadingRule {
        name: "upper-case title",
        level: 1,
        matches: is_upper_case_title,
    },
    HeadingRule {
        name: "roman numeral",
        level: 2,
        matches: is_roman_numbered,
    },
    HeadingRule {
        name: "article number",
        level: 2,
        matches: is_article,
    },
    HeadingRule {
        name: "numbered with punctuation",
        level: 2,
        matches: is_numbered_punct,
    },
    HeadingRule {
        name: "numbered with dash",
        level: 2,
        matches: is_numbered_dash,
    },
    HeadingRule {
        name: "lettered item",
        level: 3,
        matches: is_lettered,
    },
];

/// Convert a transcript into Markdown with inferred headings.
pub fn detect(text: &str) -> StructuredDocument {
    let markdown = text
        .split('\n')
        .map(render_line)
        .collect::<Vec<_>>()
        .join("\n");

    let has_structure = RE_HEADING.is_match(&markdown);
    let stats = count_headings(&markdown);

    StructuredDocument {
        markdown,
        has_structure,
        stats,
    }
}

/// First rule matching `line`, or `None` for body text.
pub fn classify(line: &str) -> Option<&'static HeadingRule> {
    let trimmed = line.trim();
    if trimmed.is_empty() || RE_MARKED.is_match(trimmed) {
        return None;
    }
    HEADING_RULES.iter().find(|rule| rule.matches(trimmed))
}

fn render_line(line: &str) -> String {
    match classify(line) {
        Some(rule) => format!("{} {}", "#".repeat(rule.level), line.trim()),
        None => line.to_string(),
    }
}

fn count_headings(markdown: &str) -> StructureStats {
    let mut stats = StructureStats::default();
    for line in markdown.lines() {
        let hashes = line.chars().take_while(|&c| c == '#').count();
        if !line[hashes..].starts_with(' ') {
            continue;
        }
        match hashes {
            1 => stats.h1_count += 1,
            2 => stats.h2_count += 1,
            3 => stats.h3_count += 1,
            _ => {}
        }
    }
    stats
}

// ── Shared patterns ──────────────────────────────────────────────────────────

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,3} ").unwrap());

static RE_MARKED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s").unwrap());

// ── Rule 1: upper-case title ─────────────────────────────────────────────────

fn is_upper_case_title(line: &str) -> bool {
    let len = line.chars().count();
    len > 4
        && len < 79
        && line.chars().any(char::is_uppercase)
        && !line.chars().any(char::is_lowercase)
}

// ── Rule 2: roman numeral ────────────────────────────────────────────────────

static RE_ROMAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:XV|XIV|XIII|XII|XI|X|IX|VIII|VII|VI|V|IV|III|II|I)(?:\.|\s|-|–|—)").unwrap()
});

fn is_roman_numbered(line: &str) -> bool {
    RE_ROMAN.is_match(line)
}

// ── Rule 3: "Article N" ──────────────────────────────────────────────────────

static RE_ARTICLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^article\s+\d+").unwrap());

fn is_article(line: &str) -> bool {
    RE_ARTICLE.is_match(line)
}

// ── Rules 4–5: numbered items ────────────────────────────────────────────────

static RE_NUMBERED_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}[./]\s+\p{Lu}").unwrap());

static RE_NUMBERED_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}\s?[-–—]\s+\p{Lu}").unwrap());

fn is_numbered_punct(line: &str) -> bool {
    line.chars().count() < 100 && RE_NUMBERED_PUNCT.is_match(line)
}

fn is_numbered_dash(line: &str) -> bool {
    line.chars().count() < 100 && RE_NUMBERED_DASH.is_match(line)
}

// ── Rule 6: lettered item ────────────────────────────────────────────────────

static RE_LETTERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][.)]\s").unwrap());

fn is_lettered(line: &str) -> bool {
    line.chars().count() < 100 && RE_LETTERED.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(line: &str) -> Option<usize> {
        classify(line).map(|r| r.level)
    }

    fn rule(name: &str) -> &'static HeadingRule {
        HEADING_RULES
            .iter()
            .find(|r| r.name == name)
            .expect("rule exists")
    }

    #[test]
    fn rule_table_order() {
        let levels: Vec<usize> = HEADING_RULES.iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![1, 2, 2, 2, 2, 3]);
        assert_eq!(HEADING_RULES[0].name, "upper-case title");
    }

    #[test]
    fn upper_case_title_bounds() {
        let r = rule("upper-case title");
        assert!(r.matches("ARTICLE PREMIER"));
        assert!(r.matches("ÉTÉ CHAUD"));
        assert!(!r.matches("ABCD"), "4 chars is too short");
        assert!(r.matches("ABCDE"));
        assert!(r.matches(&"A".repeat(78)));
        assert!(!r.matches(&"A".repeat(79)), "79 chars is too long");
        assert!(!r.matches("12345 678"), "needs a letter");
        assert!(!r.matches("ARTICLE Premier"));
    }

    #[test]
    fn uncased_scripts_are_not_titles() {
        let doc = detect(
            "这是一段普通的中文正文内容\n\
             日本語の本文テキストです\n\
             한국어 본문 텍스트입니다\n\
             هذا نص عربي عادي في الفقرة",
        );
        assert_eq!(doc.stats.h1_count, 0);
        assert!(!doc.has_structure);
        assert!(!doc.markdown.contains('#'));

        // An upper-case Latin token still qualifies a mixed line.
        assert!(rule("upper-case title").matches("第一章 PDF"));
    }

    #[test]
    fn roman_numeral_rule() {
        let r = rule("roman numeral");
        assert!(r.matches("IV. Dispositions finales"));
        assert!(r.matches("XII - Annexes"));
        assert!(r.matches("XV– Suite"));
        assert!(r.matches("II Objet"));
        assert!(!r.matches("IVa Objet"));
        assert!(!r.matches("Introduction"));
        assert!(!r.matches("XVI. Hors liste"));
    }

    #[test]
    fn article_rule() {
        let r = rule("article number");
        assert!(r.matches("Article 12"));
        assert!(r.matches("article  3 - Durée"));
        assert!(!r.matches("Article premier"));
        assert!(!r.matches("Articles 1 à 3"));
    }

    #[test]
    fn numbered_punct_rule() {
        let r = rule("numbered with punctuation");
        assert!(r.matches("1. Premier Point"));
        assert!(r.matches("12/ Objet du contrat"));
        assert!(!r.matches("123. Trop de chiffres"));
        assert!(!r.matches("1. minuscule"));
        assert!(!r.matches(&format!("1. {}", "A".repeat(97))));
    }

    #[test]
    fn numbered_dash_rule() {
        let r = rule("numbered with dash");
        assert!(r.matches("3- Conditions"));
        assert!(r.matches("3 – Conditions"));
        assert!(!r.matches("3. Conditions"));
        assert!(!r.matches("3-conditions"));
    }

    #[test]
    fn lettered_rule() {
        let r = rule("lettered item");
        assert!(r.matches("a) Sous-point"));
        assert!(r.matches("B. Autre"));
        assert!(!r.matches("ab) Deux lettres"));
        assert!(!r.matches("a)collé"));
    }

    #[test]
    fn upper_case_wins_over_numbered() {
        assert!(rule("numbered with punctuation").matches("1. PREMIER POINT"));
        assert_eq!(level("1. PREMIER POINT"), Some(1));
        assert_eq!(level("II. OBJET"), Some(1));
    }

    #[test]
    fn body_and_blank_lines_pass_through() {
        assert_eq!(level("Texte normal."), None);
        assert_eq!(level(""), None);
        assert_eq!(level("   "), None);
        assert_eq!(level("---"), None);
    }

    #[test]
    fn end_to_end_example() {
        let doc = detect("ARTICLE PREMIER\n1. Premier Point\na) Sous-point\nTexte normal.");
        assert_eq!(
            doc.markdown,
            "# ARTICLE PREMIER\n## 1. Premier Point\n### a) Sous-point\nTexte normal."
        );
        assert!(doc.has_structure);
        assert_eq!(
            doc.stats,
            StructureStats {
                h1_count: 1,
                h2_count: 1,
                h3_count: 1
            }
        );
    }

    #[test]
    fn headings_are_trimmed_body_is_not() {
        let doc = detect("   TITRE GÉNÉRAL  \n  indented body");
        assert_eq!(doc.markdown, "# TITRE GÉNÉRAL\n  indented body");
    }

    #[test]
    fn no_structure() {
        let doc = detect("juste du texte\n\nencore du texte");
        assert!(!doc.has_structure);
        assert_eq!(doc.markdown, "juste du texte\n\nencore du texte");
        assert_eq!(doc.stats, StructureStats::default());
    }

    #[test]
    fn page_separator_survives() {
        let doc = detect("Un\n\n---\n\nDeux");
        assert_eq!(doc.markdown, "Un\n\n---\n\nDeux");
    }

    #[test]
    fn detection_is_idempotent_for_every_rule() {
        let samples = [
            "CHAPITRE UN",
            "IV. Dispositions finales",
            "Article 7",
            "2. Objet",
            "3 - Durée",
            "c) Détail",
        ];
        for sample in samples {
            let once = detect(sample);
            assert!(once.has_structure, "{sample} should be a heading");
            let twice = detect(&once.markdown);
            assert_eq!(once.markdown, twice.markdown, "re-detection changed {sample}");
            assert_eq!(once.stats, twice.stats);
        }
    }
}
