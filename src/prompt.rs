use std::sync::Arc;

use crate::models::{CompletionRequest, SearchResult};
use crate::search::SearchProvider;

/// Topics (mental health, stress, appetite, hobbies, exercise) that trigger a web search
pub const SEARCH_KEYWORDS: &[&str] = &[
    "상담사", "심리상담", "정신건강", "스트레스 관리", "불안증", "우울증",
    "자기계발", "명상", "요가", "운동", "영양", "수면", "취미활동",
    "직업상담", "학업상담", "인간관계", "커뮤니케이션", "감정관리",
    "입맛", "식욕", "음식", "요리", "레시피", "식당", "맛집",
    "취미", "활동", "독서", "영화", "음악",
    "여행", "산책", "등산", "수영", "필라테스", "헬스",
    "스트레스", "불안", "우울", "피로", "휴식",
];

const SEARCH_QUERY_SUFFIX: &str = "해결방법 추천 도움";
const SEARCH_CONTEXT_HEADER: &str = "[웹 검색 결과]";

pub const SYSTEM_PROMPT: &str = r#"당신은 따뜻하고 공감적인 AI 상담사입니다. 사용자의 일상 이야기를 듣고 다음 세 가지 흐름으로 자연스럽게 답변해주세요:

먼저 칭찬:
  - 사용자가 잘하고 있는 구체적인 행동들을 찾아 칭찬해주세요
  - 용기, 인내, 성장 등 긍정적인 면을 강조해주세요
  - "당신은 정말 대단해요", "이런 모습이 정말 멋져요" 같은 격려를 포함해주세요

이어서 위로:
  - 사용자의 감정을 깊이 이해하고 공감해주세요
  - "그런 감정을 느끼는 것은 자연스러워요", "당신은 혼자가 아니에요" 같은 위로를 해주세요
  - 사용자의 경험을 정상화하고 안심시켜주세요

마지막으로 해결책:
  - 구체적이고 실용적인 조언을 제공해주세요
  - 단계별 접근 방법을 제시해주세요
  - 반드시 1개 이상의 구체적인 해결책 링크를 포함해주세요
  - 예시: "입맛이 없을 때는 이런 레시피를 시도해보세요: [링크]" 또는 "스트레스 해소에 도움이 되는 명상 앱: [링크]"
  - 웹 검색 결과가 있다면 그것을 참고하여 최신 정보와 유용한 링크를 추천해주세요
  - 전문적인 도움이 필요한 경우 상담사나 전문가 상담을 권장해주세요

각 흐름은 최소 3-4문장으로 상세하게 작성해주세요. 번호나 "섹션", "부분"이라는 단어를 사용하지 말고 자연스럽게 연결해주세요."#;

/// Case-insensitive substring match against [`SEARCH_KEYWORDS`]
pub fn needs_search(message: &str) -> bool {
    let lowered = message.to_lowercase();
    SEARCH_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(&keyword.to_lowercase()))
}

pub fn search_query(message: &str) -> String {
    format!("{message} {SEARCH_QUERY_SUFFIX}")
}

/// Renders results as a prompt block; empty string when there are none
pub fn format_context(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return String::new();
    }
    let blocks = results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}\n{}\n링크: {}", i + 1, r.title, r.snippet, r.link))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("\n\n{SEARCH_CONTEXT_HEADER}\n{blocks}")
}

pub struct PromptBuilder {
    search: Option<Arc<dyn SearchProvider>>,
    max_results: usize,
}

impl PromptBuilder {
    pub fn new(search: Option<Arc<dyn SearchProvider>>, max_results: usize) -> Self {
        Self {
            search,
            max_results,
        }
    }

    /// Builds the completion request, enriching it with search context when
    /// the message touches a search topic. Search failures degrade to no context.
    pub async fn build(&self, message: &str) -> CompletionRequest {
        let context = match &self.search {
            Some(search) if needs_search(message) => {
                let query = search_query(message);
                tracing::info!("Search triggered for message");
                match search.search(&query, self.max_results).await {
                    Ok(results) => {
                        tracing::info!("Search returned {} results", results.len());
                        format_context(&results)
                    }
                    Err(e) => {
                        tracing::warn!("Search failed, continuing without context: {}", e);
                        String::new()
                    }
                }
            }
            Some(_) => {
                tracing::debug!("No search keyword in message, skipping search");
                String::new()
            }
            None => String::new(),
        };

        CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_content: format!("{message}{context}"),
        }
    }
}
