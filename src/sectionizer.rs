//! Carves a free-text answer into praise, comfort and solution.
//!
//! The keyword strategy is a heuristic over the model's phrasing; callers
//! depend on the [`Sectionizer`] trait so a stricter format (tagged or
//! delimited output) can replace it without touching the chat service.

use crate::models::StructuredReply;

pub const DEFAULT_PRAISE: &str = "당신의 이야기를 들려주셔서 감사해요. 💪";
pub const DEFAULT_COMFORT: &str = "당신의 마음을 이해해요. 당신은 혼자가 아니에요. 💝";
pub const DEFAULT_SOLUTION: &str = "작은 것부터 하나씩 시작해보세요. 💡";

const PRAISE_KEYWORDS: &[&str] = &["칭찬", "잘한", "대단한", "멋져요", "첫 번째"];
const COMFORT_KEYWORDS: &[&str] = &["위로", "공감", "이해", "자연스러워요", "두 번째"];
const SOLUTION_KEYWORDS: &[&str] = &["해결", "조언", "방법", "링크", "추천", "세 번째"];

/// Words that mark a structural line to drop from the output
const STRUCTURE_WORDS: &[&str] = &["섹션", "부분"];

pub trait Sectionizer: Send + Sync {
    fn split(&self, answer: &str) -> StructuredReply;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Praise,
    Comfort,
    Solution,
}

impl Section {
    fn index(self) -> usize {
        match self {
            Section::Praise => 0,
            Section::Comfort => 1,
            Section::Solution => 2,
        }
    }
}

const CLASSIFICATION_ORDER: [(Section, &[&str]); 3] = [
    (Section::Praise, PRAISE_KEYWORDS),
    (Section::Comfort, COMFORT_KEYWORDS),
    (Section::Solution, SOLUTION_KEYWORDS),
];

/// Keyword-driven splitter with paragraph and equal-thirds fallbacks
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordSectionizer;

impl Sectionizer for KeywordSectionizer {
    fn split(&self, answer: &str) -> StructuredReply {
        let parts = classify_lines(answer)
            .or_else(|| split_paragraphs(answer))
            .unwrap_or_else(|| split_thirds(answer));
        finish(parts)
    }
}

fn classify(line: &str) -> Option<Section> {
    CLASSIFICATION_ORDER
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| line.contains(k)))
        .map(|(section, _)| *section)
}

/// `"<digits>."` at the start of the line
fn is_ordinal_marker(line: &str) -> bool {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && line[digits..].starts_with('.')
}

fn is_structural(line: &str) -> bool {
    is_ordinal_marker(line) || STRUCTURE_WORDS.iter().any(|w| line.contains(w))
}

/// Returns `None` when no line landed in any section
fn classify_lines(answer: &str) -> Option<[String; 3]> {
    let mut buffers: [String; 3] = Default::default();
    let mut current: Option<Section> = None;

    for line in answer.lines().map(str::trim).filter(|l| !l.is_empty()) {
        // A structural line may still move the pointer.
        if let Some(section) = classify(line) {
            current = Some(section);
        }
        if is_structural(line) {
            continue;
        }
        if let Some(section) = current {
            let buf = &mut buffers[section.index()];
            buf.push_str(line);
            buf.push('\n');
        }
    }

    if buffers.iter().all(String::is_empty) {
        None
    } else {
        Some(buffers)
    }
}

fn paragraphs(answer: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in answer.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}

/// First three blank-line separated paragraphs, if there are at least three
fn split_paragraphs(answer: &str) -> Option<[String; 3]> {
    let mut paras = paragraphs(answer).into_iter();
    match (paras.next(), paras.next(), paras.next()) {
        (Some(praise), Some(comfort), Some(solution)) => Some([praise, comfort, solution]),
        _ => None,
    }
}

/// Three contiguous slices by character count, remainder on the last
fn split_thirds(answer: &str) -> [String; 3] {
    let chars: Vec<char> = answer.chars().collect();
    let third = chars.len() / 3;
    [
        chars[..third].iter().collect(),
        chars[third..third * 2].iter().collect(),
        chars[third * 2..].iter().collect(),
    ]
}

fn finish([praise, comfort, solution]: [String; 3]) -> StructuredReply {
    fn or_default(text: String, fallback: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            fallback.to_string()
        } else {
            trimmed.to_string()
        }
    }

    StructuredReply {
        praise: or_default(praise, DEFAULT_PRAISE),
        comfort: or_default(comfort, DEFAULT_COMFORT),
        solution: or_default(solution, DEFAULT_SOLUTION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(answer: &str) -> StructuredReply {
        KeywordSectionizer.split(answer)
    }

    #[test]
    fn test_labelled_answer_lands_in_each_section() {
        let reply = split("칭찬: 정말 잘했어요.\n\n위로: 힘들었겠어요.\n\n해결: https://example.com 참고하세요.");
        assert!(reply.praise.contains("잘했어요"));
        assert!(reply.comfort.contains("힘들었겠어요"));
        assert!(reply.solution.contains("https://example.com"));
    }

    #[test]
    fn test_unlabelled_lines_follow_current_section() {
        let answer = "정말 대단한 용기를 내셨어요.\n매일 버틴 것만으로도 충분해요.\n그런 감정은 자연스러워요.\n누구라도 그랬을 거예요.\n이런 방법을 시도해보세요.\nhttps://example.com/rest";
        let reply = split(answer);
        assert_eq!(reply.praise, "정말 대단한 용기를 내셨어요.\n매일 버틴 것만으로도 충분해요.");
        assert_eq!(reply.comfort, "그런 감정은 자연스러워요.\n누구라도 그랬을 거예요.");
        assert_eq!(reply.solution, "이런 방법을 시도해보세요.\nhttps://example.com/rest");
    }

    #[test]
    fn test_lines_before_any_section_are_dropped() {
        let reply = split("안녕하세요.\n칭찬할 점이 많아요.\n위로를 드려요.\n해결책은 산책이에요.");
        assert_eq!(reply.praise, "칭찬할 점이 많아요.");
        assert!(!reply.praise.contains("안녕하세요"));
    }

    #[test]
    fn test_praise_wins_when_line_matches_several_categories() {
        let reply = split("칭찬과 위로를 함께 드려요.\n이해해요, 위로가 되길 바라요.");
        assert_eq!(reply.praise, "칭찬과 위로를 함께 드려요.");
        assert_eq!(reply.comfort, "이해해요, 위로가 되길 바라요.");
        assert_eq!(reply.solution, DEFAULT_SOLUTION);
    }

    #[test]
    fn test_structural_lines_move_pointer_but_are_dropped() {
        let answer = "1. 칭찬\n오늘 하루도 버텼어요.\n두 번째 부분입니다\n많이 지치셨죠.\n3.\n세 번째 섹션: 해결\n산책을 해보세요.";
        let reply = split(answer);
        assert_eq!(reply.praise, "오늘 하루도 버텼어요.");
        assert_eq!(reply.comfort, "많이 지치셨죠.");
        assert_eq!(reply.solution, "산책을 해보세요.");
    }

    #[test]
    fn test_revisited_section_accumulates() {
        let reply = split("칭찬해요.\n위로해요.\n다시 칭찬해요.");
        assert_eq!(reply.praise, "칭찬해요.\n다시 칭찬해요.");
        assert_eq!(reply.comfort, "위로해요.");
    }

    #[test]
    fn test_paragraph_fallback_takes_first_three() {
        let answer = "오늘 정말 수고 많았어요.\n\n마음이 무거웠겠어요.\n\n잠깐 쉬어가도 돼요.\n\n마지막 인사예요.";
        let reply = split(answer);
        assert_eq!(reply.praise, "오늘 정말 수고 많았어요.");
        assert_eq!(reply.comfort, "마음이 무거웠겠어요.");
        assert_eq!(reply.solution, "잠깐 쉬어가도 돼요.");
    }

    #[test]
    fn test_equal_thirds_reconstructs_input() {
        let answer = "오늘은평범한하루였다";
        let parts = split_thirds(answer);
        assert_eq!(parts.concat(), answer);
        assert_eq!(parts[0].chars().count(), 3);
        assert_eq!(parts[1].chars().count(), 3);
        assert_eq!(parts[2].chars().count(), 4);

        let reply = split(answer);
        assert_eq!(format!("{}{}{}", reply.praise, reply.comfort, reply.solution), answer);
    }

    #[test]
    fn test_two_paragraphs_fall_through_to_thirds() {
        let reply = split("abcdef\n\nghijk");
        assert_eq!(reply.praise, "abcd");
        assert_eq!(reply.comfort, "ef");
        assert_eq!(reply.solution, "ghijk");
    }

    #[test]
    fn test_empty_and_short_inputs_get_defaults() {
        let reply = split("");
        assert_eq!(reply.praise, DEFAULT_PRAISE);
        assert_eq!(reply.comfort, DEFAULT_COMFORT);
        assert_eq!(reply.solution, DEFAULT_SOLUTION);

        let reply = split("네");
        assert_eq!(reply.praise, DEFAULT_PRAISE);
        assert_eq!(reply.comfort, DEFAULT_COMFORT);
        assert_eq!(reply.solution, "네");

        let reply = split("   \n\n  ");
        assert!(!reply.praise.is_empty() && !reply.comfort.is_empty() && !reply.solution.is_empty());
    }

    #[test]
    fn test_split_is_deterministic() {
        let answer = "정말 멋져요.\n공감해요.\n추천 링크: https://example.com";
        assert_eq!(split(answer), split(answer));
    }

    #[test]
    fn test_ordinal_marker_detection() {
        assert!(is_ordinal_marker("1. 시작"));
        assert!(is_ordinal_marker("12."));
        assert!(!is_ordinal_marker("1번"));
        assert!(!is_ordinal_marker(".1"));
        assert!(!is_ordinal_marker("오늘"));
    }
}
