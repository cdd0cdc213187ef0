//! Offline responder: picks a reply from fixed tables by keyword, with no
//! provider calls. Also owns the canned reply shown when the completion
//! provider is rate limited.

use crate::models::StructuredReply;

/// Reply substituted when the completion provider is out of quota
pub fn canned_reply() -> StructuredReply {
    StructuredReply {
        praise: "이렇게 용감하게 마음을 나누어 주셔서 감사해요. 💪".to_string(),
        comfort: "지금 힘든 시간을 보내고 계시는군요. 당신은 혼자가 아니에요. 💝".to_string(),
        solution: "작은 것부터 하나씩 시작해보세요. 당신은 할 수 있어요. 💡".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emotion {
    Sad,
    Angry,
    Anxious,
    Tired,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Situation {
    Work,
    Relationship,
    Study,
    General,
}

const EMOTION_KEYWORDS: [(Emotion, &[&str]); 4] = [
    (Emotion::Sad, &["슬퍼", "우울", "힘들어", "절망", "외로", "아파"]),
    (Emotion::Angry, &["화나", "짜증", "분노", "열받", "싫어", "스트레스"]),
    (Emotion::Anxious, &["불안", "걱정", "두려", "무서", "긴장"]),
    (Emotion::Tired, &["피곤", "지쳐", "힘없", "번아웃", "무기력"]),
];

const SITUATION_KEYWORDS: [(Situation, &[&str]); 3] = [
    (Situation::Work, &["회사", "직장", "업무", "상사", "동료", "일"]),
    (Situation::Relationship, &["연애", "남친", "여친", "헤어", "사랑"]),
    (Situation::Study, &["공부", "시험", "학교", "성적", "대학"]),
];

fn first_match<T: Copy>(text: &str, table: &[(T, &[&str])]) -> Option<T> {
    table
        .iter()
        .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(category, _)| *category)
}

pub fn detect_emotion(story: &str) -> Emotion {
    first_match(&story.to_lowercase(), &EMOTION_KEYWORDS).unwrap_or(Emotion::Neutral)
}

pub fn detect_situation(story: &str) -> Situation {
    first_match(&story.to_lowercase(), &SITUATION_KEYWORDS).unwrap_or(Situation::General)
}

fn praise_for(situation: Situation) -> &'static str {
    match situation {
        Situation::General => "이렇게 용감하게 마음을 나누어 주셔서 정말 감사해요. 어려운 상황에서도 해결책을 찾으려는 모습이 대단합니다. 💪",
        Situation::Work => "직장에서의 어려움을 잘 견뎌내고 계시는군요. 업무 스트레스 속에서도 균형을 찾으려는 노력이 보여요. 💪",
        Situation::Relationship => "관계에서 진심을 다하는 모습이 아름다워요. 사랑하는 마음 자체가 이미 충분히 가치있어요. 💪",
        Situation::Study => "학업에 대한 열정과 노력이 정말 대단해요. 목표를 향해 꾸준히 나아가는 모습이 인상적이에요. 💪",
    }
}

fn comfort_for(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Sad => "마음이 많이 아프셨을 것 같아요. 슬픈 감정을 느끼는 것은 자연스러운 일이고, 지금의 아픔이 영원하지 않다는 것을 기억해 주세요. 💝",
        Emotion::Angry => "화가 나는 것도 당연해요. 그 감정을 인정하고 받아들이는 것이 중요해요. 분노를 긍정적으로 활용할 수 있을 거예요. 💝",
        Emotion::Anxious => "불안한 마음, 충분히 이해해요. 깊게 숨을 들이쉬고 천천히 내쉬어보세요. 지금 이 순간에 집중하면서 한 걸음씩 나아가면 돼요. 💝",
        Emotion::Tired => "정말 많이 피곤하셨겠어요. 충분한 휴식을 취하는 것도 중요한 일이에요. 때로는 잠시 멈춰 서서 자신을 돌보는 시간이 필요해요. 💝",
        Emotion::Neutral => "당신의 마음을 이해하고 있어요. 어떤 감정이든 소중하고, 당신은 혼자가 아니라는 것을 기억해 주세요. 💝",
    }
}

fn solution_for(situation: Situation) -> &'static str {
    match situation {
        Situation::Work => "업무 스트레스는 작은 휴식부터 시작해보세요. 점심시간에 잠깐 산책하거나 동료와의 소통을 늘려보세요. 당신은 충분히 해낼 수 있어요. 💡",
        Situation::Relationship => "솔직한 대화가 관계 개선의 첫걸음이에요. 상대방의 입장도 생각해보고, 자신을 먼저 사랑하는 것부터 시작해보세요. 💡",
        Situation::Study => "목표를 작은 단위로 나누어 하나씩 달성해나가세요. 완벽을 추구하기보다는 꾸준함을 추구하는 것이 더 중요해요. 💡",
        Situation::General => "한 번에 모든 것을 해결하려 하지 마시고, 작은 것부터 차근차근 시작해보세요. 믿을 만한 사람과 대화하는 것도 큰 도움이 됩니다. 💡",
    }
}

/// Keyword classifier over emotion and situation
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordResponder;

impl KeywordResponder {
    pub fn respond(&self, story: &str) -> StructuredReply {
        let emotion = detect_emotion(story);
        let situation = detect_situation(story);
        tracing::debug!(?emotion, ?situation, "Heuristic reply classification");

        StructuredReply {
            praise: praise_for(situation).to_string(),
            comfort: comfort_for(emotion).to_string(),
            solution: solution_for(situation).to_string(),
        }
    }
}
