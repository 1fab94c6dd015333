//! # 채팅 어댑터
//!
//! 채팅 메시지 한 건을 해석해 알맞은 기능으로 보내고, 보낼 메시지 목록을 돌려줍니다.
//!
//! - `/`로 시작하면 명령어. 드릴 중이어도 명령어가 먼저 처리됩니다.
//! - 그 외 텍스트는 드릴이 진행 중일 때만 드릴 엔진으로 갑니다.
//!
//! 같은 사용자의 메시지는 호출하는 쪽에서 `UserLocks`로 직렬화합니다.

use rand::Rng;
use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::drill::Prompt;
use crate::models::user::{Role, UserSession};
use crate::services::{drill, roles};

/// 채팅 명령어
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    /// `/role`, `/role teacher <password>`, `/role student <level>`
    Role(Vec<String>),
    Help,
    Flashcards,
    /// `/stopcard`, `/cancel`
    Stop,
    Modules,
    Words,
    Unknown(String),
}

impl Command {
    /// 명령어가 아니면 None을 반환합니다.
    ///
    /// `/start@dori_bot`처럼 봇 이름이 붙은 형태도 받아들입니다.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let name = name.split('@').next().unwrap_or_default().to_lowercase();
        let args: Vec<String> = parts.map(str::to_string).collect();

        Some(match name.as_str() {
            "start" => Command::Start,
            "role" => Command::Role(args),
            "help" => Command::Help,
            "flashcards" => Command::Flashcards,
            "stopcard" | "cancel" => Command::Stop,
            "modules" => Command::Modules,
            "words" => Command::Words,
            _ => Command::Unknown(name),
        })
    }
}

const ROLE_CHOICES: &str = "Choose your role:\n\
    /role teacher <password>\n\
    /role student <A1|A2|B1>";

/// 메시지 한 건을 처리합니다.
pub async fn handle_message<R>(
    pool: &SqlitePool,
    teacher_hash: &str,
    user: &UserSession,
    text: &str,
    rng: &mut R,
) -> Result<Vec<Prompt>, AppError>
where
    R: Rng + Send + ?Sized,
{
    let Some(command) = Command::parse(text) else {
        return Ok(match drill::handle_reply(pool, &user.id, text, rng).await? {
            Some(prompts) => prompts,
            None => vec![Prompt::text(
                "Send /flashcards to start a drill or /help to see the commands.",
            )],
        });
    };
    tracing::debug!(user_id = %user.id, ?command, "chat command");

    match command {
        Command::Start => Ok(vec![greeting(user)]),
        Command::Role(args) => select_role(pool, teacher_hash, user, &args).await,
        Command::Help => Ok(vec![help(user)]),
        Command::Flashcards => drill::start_drill(pool, &user.id).await,
        Command::Stop => drill::stop(pool, &user.id).await,
        Command::Modules => {
            let modules = db::list_modules(pool, &user.id).await?;
            Ok(vec![Prompt::text(if modules.is_empty() {
                "No modules yet.".to_string()
            } else {
                format!("Modules: {}", modules.join(", "))
            })])
        }
        Command::Words => {
            let words = db::list_visible_words(pool, &user.id, None).await?;
            Ok(vec![Prompt::text(if words.is_empty() {
                "No words yet.".to_string()
            } else {
                words
                    .iter()
                    .map(|w| format!("{}. {} – {}", w.id, w.text, w.translation))
                    .collect::<Vec<_>>()
                    .join("\n")
            })])
        }
        Command::Unknown(name) => Ok(vec![Prompt::text(format!(
            "Unknown command /{name}. Send /help to see the commands."
        ))]),
    }
}

fn greeting(user: &UserSession) -> Prompt {
    match user.role {
        None => Prompt::text(format!("Welcome to Dori! {ROLE_CHOICES}")),
        Some(Role::Teacher) => Prompt::text("Welcome back, teacher! Send /help to see the commands."),
        Some(Role::Student) => Prompt::text(format!(
            "Welcome back! Your level is {}. Send /flashcards to practice.",
            user.level
        )),
    }
}

fn help(user: &UserSession) -> Prompt {
    let common = "/flashcards - start a flash card drill\n\
        /stopcard - stop the drill\n\
        /modules - list modules\n\
        /words - list your words\n\
        /role - change your role";
    match user.role {
        Some(Role::Teacher) => Prompt::text(format!(
            "{common}\n\nTeacher tools (HTTP API):\n\
             POST /api/v1/words - add a word\n\
             POST /api/v1/words/batch - add words, one `word - translation - synonyms - module` per line\n\
             PUT /api/v1/words/{{id}}/synonyms - set synonyms (`-` clears)\n\
             POST /api/v1/library/grants - share a word with a student"
        )),
        Some(Role::Student) => Prompt::text(format!(
            "{common}\n\nYour dictionary (HTTP API):\n\
             POST /api/v1/me/words - add a personal word\n\
             GET /api/v1/me/progress - see your progress"
        )),
        None => Prompt::text(format!("{common}\n\n{ROLE_CHOICES}")),
    }
}

/// `/role ...` 처리. 잘못된 입력이나 틀린 비밀번호는 에러 응답이 아니라 안내 메시지로 돌려줍니다.
async fn select_role(
    pool: &SqlitePool,
    teacher_hash: &str,
    user: &UserSession,
    args: &[String],
) -> Result<Vec<Prompt>, AppError> {
    let Some(role) = args.first() else {
        return Ok(vec![Prompt::text(ROLE_CHOICES)]);
    };
    let role: Role = match role.parse() {
        Ok(role) => role,
        Err(_) => return Ok(vec![Prompt::text(ROLE_CHOICES)]),
    };
    let value = args.get(1).map(String::as_str);
    let (password, level) = match role {
        Role::Teacher => (value, None),
        Role::Student => (None, value),
    };

    match roles::select_role(pool, teacher_hash, &user.id, role, password, level).await {
        Ok(updated) => Ok(vec![Prompt::text(match updated.role {
            Some(Role::Teacher) => "You are now a teacher.".to_string(),
            _ => format!("You are now a student (level {}).", updated.level),
        })]),
        Err(AppError::Unauthorized(_)) => Ok(vec![Prompt::text("Wrong password.")]),
        Err(AppError::BadRequest(msg)) => Ok(vec![Prompt::text(msg)]),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users as db_users;
    use crate::middleware::auth::hash_password;
    use crate::models::word::{Author, NewWord};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn parses_commands_and_arguments() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse(" /Start@dori_bot "), Some(Command::Start));
        assert_eq!(
            Command::parse("/role student a2"),
            Some(Command::Role(vec!["student".to_string(), "a2".to_string()]))
        );
        assert_eq!(Command::parse("/cancel"), Some(Command::Stop));
        assert_eq!(Command::parse("/stopcard"), Some(Command::Stop));
        assert_eq!(Command::parse("/dance"), Some(Command::Unknown("dance".to_string())));
        assert_eq!(Command::parse("cat"), None);
    }

    async fn send(pool: &SqlitePool, hash: &str, user_id: &str, text: &str) -> Vec<String> {
        let mut rng = StdRng::seed_from_u64(3);
        let user = db_users::get_or_create_user(pool, user_id).await.unwrap();
        handle_message(pool, hash, &user, text, &mut rng)
            .await
            .unwrap()
            .iter()
            .filter_map(|p| p.as_text().map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn start_asks_new_users_for_a_role() {
        let pool = db::testing::test_pool().await;
        let replies = send(&pool, "unused", "u1", "/start").await;
        assert!(replies[0].contains("/role student"));
    }

    #[tokio::test]
    async fn role_commands_update_the_user() {
        let pool = db::testing::test_pool().await;
        let hash = hash_password("pw").unwrap();

        let replies = send(&pool, &hash, "u1", "/role teacher wrong").await;
        assert_eq!(replies, vec!["Wrong password."]);

        let replies = send(&pool, &hash, "u1", "/role teacher pw").await;
        assert_eq!(replies, vec!["You are now a teacher."]);

        let replies = send(&pool, &hash, "u2", "/role student a2").await;
        assert!(replies[0].contains("level A2"));

        let replies = send(&pool, &hash, "u2", "/role").await;
        assert_eq!(replies, vec![ROLE_CHOICES]);
    }

    #[tokio::test]
    async fn plain_text_without_drill_gets_a_hint() {
        let pool = db::testing::test_pool().await;
        let replies = send(&pool, "unused", "u1", "hello").await;
        assert!(replies[0].contains("/flashcards"));
    }

    #[tokio::test]
    async fn full_drill_over_chat() {
        let pool = db::testing::test_pool().await;
        db_users::get_or_create_user(&pool, "teacher").await.unwrap();
        let mut word = NewWord::new("bird", "птица").unwrap();
        word.module = Some("1".to_string());
        db::create_word(&pool, "teacher", Author::Teacher, &word).await.unwrap();

        let replies = send(&pool, "unused", "u1", "/modules").await;
        assert_eq!(replies, vec!["Modules: 1"]);

        send(&pool, "unused", "u1", "/flashcards").await;
        let replies = send(&pool, "unused", "u1", "all").await;
        assert!(replies.iter().any(|r| r.contains("птица")));

        let replies = send(&pool, "unused", "u1", "bird").await;
        assert!(replies[0].starts_with("✅"));
        assert!(replies.iter().any(|r| r.contains("Drill complete")));

        let replies = send(&pool, "unused", "u1", "bird").await;
        assert!(replies[0].contains("/flashcards"));
    }

    #[tokio::test]
    async fn commands_win_over_drill_answers() {
        let pool = db::testing::test_pool().await;
        db_users::get_or_create_user(&pool, "teacher").await.unwrap();
        let word = NewWord::new("dog", "собака").unwrap();
        db::create_word(&pool, "teacher", Author::Teacher, &word).await.unwrap();

        send(&pool, "unused", "u1", "/flashcards").await;
        send(&pool, "unused", "u1", "all").await;
        let replies = send(&pool, "unused", "u1", "/words").await;
        assert!(replies[0].contains("dog – собака"));

        let replies = send(&pool, "unused", "u1", "/cancel").await;
        assert!(replies[0].contains("stopped"));
    }
}
