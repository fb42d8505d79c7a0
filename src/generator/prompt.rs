//! Structured prompt assembly for the text-generation provider.
//!
//! A prompt is a stack of short instructions: TOS guardrail, tone, stream
//! context, audience addressing, output format, an avoid-list built from
//! the channel's recent lines, and the streamer's name when known. Tone
//! and rule tables are keyed by mode × language (en/ru/es).

use crate::models::options::{Lang, Mode, StreamKind, TaskType};

/// System message sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You generate one single-line output for a live stream overlay. \
     Keep it ≤140 chars, no quotes, no numbering, no emojis unless natural. TOS-safe.";

/// Everything the prompt builder needs for one request.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    /// Tone of the requested line.
    pub mode: Mode,
    /// Kind of line requested.
    pub task_type: TaskType,
    /// Stream context.
    pub stream_kind: StreamKind,
    /// Prompt language.
    pub lang: Lang,
    /// Recent lines the new one must not paraphrase, newest first.
    pub recent: Vec<String>,
    /// Streamer display name, when the token carried one.
    pub streamer: Option<String>,
}

/// Assemble the user prompt for one generation attempt.
#[must_use]
pub fn build_prompt(spec: &PromptSpec) -> String {
    let guard = "Stay TOS-safe: no slurs, hate, harassment, explicit sexual content, \
         dangerous acts, or glorifying illegal activity.";
    let mut parts = vec![
        guard.to_owned(),
        tone_instruction(spec.mode, spec.lang).to_owned(),
        stream_hint(spec.stream_kind, spec.lang).to_owned(),
        audience_hint(spec.task_type, spec.lang).to_owned(),
        style_rule(spec.task_type, spec.lang).to_owned(),
    ];
    if !spec.recent.is_empty() {
        parts.push(avoid_instruction(&spec.recent, spec.lang));
    }
    if let Some(name) = spec.streamer.as_deref().filter(|name| !name.is_empty()) {
        parts.push(match spec.lang {
            Lang::Ru => format!("Имя стримера: {name}."),
            Lang::Es => format!("Nombre del streamer: {name}."),
            Lang::En => format!("Streamer name: {name}."),
        });
    }
    parts.join("\n")
}

fn tone_instruction(mode: Mode, lang: Lang) -> &'static str {
    match lang {
        Lang::Ru => match mode {
            Mode::Funny => "Лёгкий юмор, остроумно, без пошлости.",
            Mode::Motivator => "Поддерживай и заряжай энергией.",
            Mode::Serious => "Коротко, по делу, уверенно.",
            Mode::Chill => "Расслабленно и ненавязчиво.",
            Mode::Urban => "Современный уличный сленг и ритм, TOS-safe (без оскорблений).",
            Mode::Edgy => "Острее/подначивание, но без травли и оскорблений (TOS-safe).",
        },
        Lang::Es => match mode {
            Mode::Funny => "Ligero y con humor, sin vulgaridad.",
            Mode::Motivator => "Apoya y da energía.",
            Mode::Serious => "Conciso y directo.",
            Mode::Chill => "Relajado y sin presión.",
            Mode::Urban => "Jerga urbana moderna, TOS-safe (sin insultos).",
            Mode::Edgy => "Más agudo/sarcástico, pero sin acoso (TOS-safe).",
        },
        Lang::En => match mode {
            Mode::Funny => "Playful, witty, no crudeness.",
            Mode::Motivator => "Supportive, energizing.",
            Mode::Serious => "Concise and focused.",
            Mode::Chill => "Relaxed, low-pressure.",
            Mode::Urban => "Modern street/urban slang vibe, TOS-safe (no slurs).",
            Mode::Edgy => "Sharper/roast-y but TOS-safe (no harassment).",
        },
    }
}

fn audience_hint(task_type: TaskType, lang: Lang) -> &'static str {
    if task_type == TaskType::Banter {
        match lang {
            Lang::Ru => "Иногда обращайся к зрителям 1-2 словами (напр. «чат, как думаете?»).",
            Lang::Es => "A veces dirígete a los espectadores en 1-2 palabras (p. ej., “chat, ¿qué opinan?”).",
            Lang::En => "Sometimes address the viewers in 1-2 words (e.g., “chat, thoughts?”).",
        }
    } else {
        match lang {
            Lang::Ru => "Адресуй задание стримеру.",
            Lang::Es => "Dirige la tarea al streamer.",
            Lang::En => "Address the task to the streamer.",
        }
    }
}

fn style_rule(task_type: TaskType, lang: Lang) -> &'static str {
    match task_type {
        TaskType::Question => match lang {
            Lang::Ru => {
                "Дай 1 *живой* вопрос с эмоцией, без клише, до 140 символов, без нумерации, БЕЗ кавычек, только строка."
            }
            Lang::Es => {
                "Da 1 pregunta *viva* con emoción, sin clichés, máx 140 caracteres, sin numeración, SIN comillas, solo una línea."
            }
            Lang::En => {
                "Give 1 *alive* question with emotion, no clichés, ≤140 chars, no numbering, NO quotes, one single line."
            }
        },
        TaskType::Banter => match lang {
            Lang::Ru => "Дай 1 реплику/подкол с юмором, до 140 символов, без нумерации и кавычек.",
            Lang::Es => "Da 1 línea/banter con humor, máx 140 caracteres, sin numeración ni comillas.",
            Lang::En => "Give 1 banter line with humor, ≤140 chars, no numbering, no quotes.",
        },
        TaskType::Task => match lang {
            Lang::Ru => {
                "Дай 1 конкретное микро-задание для стримера, до 140 символов, без нумерации и кавычек."
            }
            Lang::Es => {
                "Da 1 micro-tarea concreta para el streamer, máx 140 caracteres, sin numeración ni comillas."
            }
            Lang::En => {
                "Give 1 concrete micro-task for the streamer, ≤140 chars, no numbering, no quotes."
            }
        },
    }
}

fn stream_hint(stream_kind: StreamKind, lang: Lang) -> &'static str {
    match stream_kind {
        StreamKind::Irl => match lang {
            Lang::Ru => "Контекст: IRL (на ходу/на улице).",
            Lang::Es => "Contexto: IRL (en movimiento).",
            Lang::En => "Context: IRL (on the move).",
        },
        StreamKind::JustChatting => match lang {
            Lang::Ru => "Контекст: Just Chatting (у стола, общение).",
            Lang::Es => "Contexto: Just Chatting (a cámara).",
            Lang::En => "Context: Just Chatting (at desk).",
        },
        StreamKind::Other => match lang {
            Lang::Ru => "Контекст: разное.",
            Lang::Es => "Contexto: variado.",
            Lang::En => "Context: mixed.",
        },
    }
}

fn avoid_instruction(recent: &[String], lang: Lang) -> String {
    match lang {
        Lang::Ru => format!(
            "Избегай повторов по смыслу с недавними: {}.",
            recent
                .iter()
                .map(|line| format!("«{line}»"))
                .collect::<Vec<_>>()
                .join("; ")
        ),
        Lang::Es => format!(
            "Evita solaparte con recientes: {}.",
            recent
                .iter()
                .map(|line| format!("“{line}”"))
                .collect::<Vec<_>>()
                .join("; ")
        ),
        Lang::En => format!(
            "Avoid semantic duplicates of recent ones: {}",
            recent.join(" | ")
        ),
    }
}
