//! `moderate` and `admin` subcommands over the moderation and admin services.

use dedaena_core::analysis::{Confidence, DetectedTour, WordStatus};
use dedaena_core::model::{
    AuditQuery, ContentChange, ContentFilter, ContentItem, ContentKind, RoleFilter, RoleFlag,
    TourPosition, UserFilter, UserId, UserRecord,
};
use services::{AdminService, ModerationService, UserBoard};

use crate::{Args, ArgsError};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) fn parse_kind(raw: &str) -> Result<ContentKind, ArgsError> {
    ContentKind::ALL
        .into_iter()
        .find(|kind| raw == kind.endpoint() || raw == kind.plural())
        .ok_or_else(|| ArgsError::InvalidValue {
            what: "content kind",
            raw: raw.to_string(),
        })
}

pub(crate) fn parse_role_filter(raw: &str) -> Result<RoleFilter, ArgsError> {
    match raw {
        "all" => Ok(RoleFilter::All),
        "admin" => Ok(RoleFilter::Admin),
        "moder" | "moderator" => Ok(RoleFilter::Moderator),
        "user" => Ok(RoleFilter::User),
        other => Err(ArgsError::InvalidValue {
            what: "role",
            raw: other.to_string(),
        }),
    }
}

fn parse_role_flag(raw: &str) -> Result<RoleFlag, ArgsError> {
    match raw {
        "admin" => Ok(RoleFlag::Admin),
        "moder" | "moderator" => Ok(RoleFlag::Moderator),
        other => Err(ArgsError::InvalidValue {
            what: "role",
            raw: other.to_string(),
        }),
    }
}

fn parse_switch(raw: &str) -> Result<bool, ArgsError> {
    match raw {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(ArgsError::InvalidValue {
            what: "on/off",
            raw: other.to_string(),
        }),
    }
}

fn arg<'a>(rest: &'a [String], index: usize, name: &'static str) -> Result<&'a str, ArgsError> {
    rest.get(index)
        .map(String::as_str)
        .ok_or(ArgsError::MissingArgument { name })
}

fn position_arg(rest: &[String], index: usize) -> Result<TourPosition, ArgsError> {
    let raw = arg(rest, index, "tour")?;
    raw.parse().map_err(|_| ArgsError::InvalidPosition {
        raw: raw.to_string(),
    })
}

fn index_arg(rest: &[String], index: usize) -> Result<usize, ArgsError> {
    let raw = arg(rest, index, "index")?;
    raw.parse().map_err(|_| ArgsError::InvalidValue {
        what: "index",
        raw: raw.to_string(),
    })
}

fn user_arg(rest: &[String], index: usize) -> Result<UserId, ArgsError> {
    let raw = arg(rest, index, "user id")?;
    raw.parse().map_err(|_| ArgsError::InvalidValue {
        what: "user id",
        raw: raw.to_string(),
    })
}

/// Remaining words joined back into one text, so unquoted Georgian sentences
/// work too.
fn text_from(rest: &[String], index: usize) -> Result<String, ArgsError> {
    let text = rest.get(index..).unwrap_or_default().join(" ");
    if text.trim().is_empty() {
        return Err(ArgsError::MissingArgument { name: "text" });
    }
    Ok(text)
}

//
// ─── MODERATE ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ModerateAction {
    List,
    Change(ContentChange),
    Detect(String),
    Check { position: TourPosition, sentence: String },
}

impl ModerateAction {
    pub(crate) fn parse(positional: &[String]) -> Result<Self, ArgsError> {
        let Some((action, rest)) = positional.split_first() else {
            return Ok(Self::List);
        };
        let action = match action.as_str() {
            "list" => Self::List,
            "add" => Self::Change(ContentChange::Add {
                kind: parse_kind(arg(rest, 0, "kind")?)?,
                position: position_arg(rest, 1)?,
                content: text_from(rest, 2)?,
            }),
            "update" => Self::Change(ContentChange::Update {
                kind: parse_kind(arg(rest, 0, "kind")?)?,
                position: position_arg(rest, 1)?,
                index: index_arg(rest, 2)?,
                content: text_from(rest, 3)?,
            }),
            "delete" => Self::Change(ContentChange::Delete {
                kind: parse_kind(arg(rest, 0, "kind")?)?,
                position: position_arg(rest, 1)?,
                index: index_arg(rest, 2)?,
            }),
            "detect" => Self::Detect(text_from(rest, 0)?),
            "check" => Self::Check {
                position: position_arg(rest, 0)?,
                sentence: text_from(rest, 1)?,
            },
            other => {
                return Err(ArgsError::UnknownAction {
                    command: "moderate",
                    action: other.to_string(),
                });
            }
        };
        Ok(action)
    }
}

fn describe_detected(detected: Option<DetectedTour>) -> String {
    match detected {
        Some(found) => {
            let confidence = match found.confidence {
                Confidence::High => "high",
                Confidence::Medium => "medium",
            };
            format!("tour {} ({}), {confidence} confidence", found.position, found.letter)
        }
        None => "no tour letter found".to_string(),
    }
}

fn print_item(item: &ContentItem) {
    println!("{:<16} {}  {}", item.id, item.letter, item.content);
}

pub(crate) async fn moderate(
    service: &ModerationService,
    table: &str,
    action: ModerateAction,
    args: &Args,
) -> CommandResult {
    let mut board = service.load_board(table).await?;

    match action {
        ModerateAction::List => {
            let counts = board.counts();
            println!(
                "{table}: words {}  sentences {}  proverbs {}  reading {}",
                counts.words, counts.sentences, counts.proverbs, counts.reading
            );
            let kinds = args.kind.map_or(ContentKind::ALL.to_vec(), |kind| vec![kind]);
            let mut shown = 0;
            for kind in kinds {
                board.filter = Some(ContentFilter {
                    kind,
                    tour: args.tour,
                    search: args.search.clone().unwrap_or_default(),
                });
                for item in board.visible_items() {
                    print_item(&item);
                    shown += 1;
                }
            }
            println!("{shown} shown");
        }
        ModerateAction::Change(change) => {
            if let ContentChange::Add {
                position, content, ..
            } = &change
            {
                if let Some(found) = board.detect_tour(content) {
                    if found.position != *position {
                        println!("note: text looks like {}", describe_detected(Some(found)));
                    }
                }
            }
            let summary = format!(
                "{} {} in tour {}",
                change.action().endpoint(),
                change.kind(),
                change.position()
            );
            service.submit(&mut board, change).await?;
            println!("saved: {summary}");
        }
        ModerateAction::Detect(text) => {
            println!("{}", describe_detected(board.detect_tour(&text)));
            let index = board.word_index();
            for word in index.analyze_sentence(&text) {
                let tours: Vec<String> = word.exists_in.iter().map(ToString::to_string).collect();
                if tours.is_empty() {
                    println!("  {:<16} new, {}", word.word, describe_detected(word.estimated));
                } else {
                    println!("  {:<16} in tours {}", word.word, tours.join(", "));
                }
            }
        }
        ModerateAction::Check { position, sentence } => {
            let index = board.word_index();
            for word in index.classify_sentence(position, &sentence) {
                let status = match word.status {
                    WordStatus::Current => "current tour".to_string(),
                    WordStatus::Previous { position, letter } => {
                        format!("from tour {position} ({letter})")
                    }
                    WordStatus::Invalid => {
                        format!("unknown, {}", describe_detected(word.suggested))
                    }
                };
                println!("  {:<16} {status}", word.word);
            }
        }
    }
    Ok(())
}

//
// ─── ADMIN ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AdminAction {
    Users,
    Toggle(UserId),
    Role {
        id: UserId,
        flag: RoleFlag,
        value: bool,
    },
    Delete(UserId),
    Logs,
    Stats,
}

impl AdminAction {
    pub(crate) fn parse(positional: &[String]) -> Result<Self, ArgsError> {
        let Some((action, rest)) = positional.split_first() else {
            return Ok(Self::Users);
        };
        let action = match action.as_str() {
            "users" => Self::Users,
            "toggle" => Self::Toggle(user_arg(rest, 0)?),
            "role" => Self::Role {
                id: user_arg(rest, 0)?,
                flag: parse_role_flag(arg(rest, 1, "admin|moder")?)?,
                value: parse_switch(arg(rest, 2, "on|off")?)?,
            },
            "delete" => Self::Delete(user_arg(rest, 0)?),
            "logs" => Self::Logs,
            "stats" => Self::Stats,
            other => {
                return Err(ArgsError::UnknownAction {
                    command: "admin",
                    action: other.to_string(),
                });
            }
        };
        Ok(action)
    }
}

fn print_user(user: &UserRecord) {
    println!(
        "{:>5}  {:<20} {:<30} {:<9} {}",
        user.id.value(),
        user.username,
        user.email,
        user.role().as_str(),
        if user.is_active { "active" } else { "inactive" }
    );
}

fn print_board_user(board: &UserBoard, id: UserId) {
    if let Some(user) = board.get(id) {
        print_user(user);
    }
}

pub(crate) async fn admin(service: &AdminService, action: AdminAction, args: &Args) -> CommandResult {
    match action {
        AdminAction::Users => {
            let mut board = service.load_users().await?;
            board.filter = UserFilter {
                search: args.search.clone().unwrap_or_default(),
                role: args.role.unwrap_or_default(),
            };
            let visible = board.visible();
            for user in &visible {
                print_user(user);
            }
            println!("{} of {} users", visible.len(), board.total());
        }
        AdminAction::Toggle(id) => {
            let mut board = service.load_users().await?;
            service.toggle_active(&mut board, id).await?;
            print_board_user(&board, id);
        }
        AdminAction::Role { id, flag, value } => {
            let mut board = service.load_users().await?;
            service.set_role(&mut board, id, flag, value).await?;
            print_board_user(&board, id);
        }
        AdminAction::Delete(id) => {
            let mut board = service.load_users().await?;
            service.delete_user(&mut board, id).await?;
            println!("deleted user {id}; {} users left", board.total());
        }
        AdminAction::Logs => {
            let query = AuditQuery {
                page: args.page.unwrap_or(1),
                username: args.user.clone(),
                action: args.action.clone(),
                table_name: args.audit_table.clone(),
                ..AuditQuery::default()
            };
            let page = service.audit_logs(&query).await?;
            for log in &page.logs {
                let at = log
                    .created_at
                    .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
                let record = log.record_id.map_or_else(String::new, |id| format!("#{id}"));
                println!(
                    "{at}  {:<16} {:<8} {} {record}",
                    log.username, log.action, log.table_name
                );
            }
            println!(
                "page {} of {} ({} entries)",
                query.page.max(1),
                page.total_pages.max(1),
                page.total
            );
        }
        AdminAction::Stats => {
            let stats = service.audit_stats().await?;
            println!(
                "{} events, {} in the last 24 hours",
                stats.total_logs, stats.recent_activity
            );
            for (action, count) in &stats.actions {
                println!("  action {action:<12} {count}");
            }
            for (table, count) in &stats.tables {
                println!("  table  {table:<20} {count}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| (*arg).to_string()).collect()
    }

    fn pos(value: u32) -> TourPosition {
        TourPosition::new(value).unwrap()
    }

    #[test]
    fn moderate_defaults_to_list() {
        assert_eq!(ModerateAction::parse(&[]).unwrap(), ModerateAction::List);
        assert_eq!(
            ModerateAction::parse(&words(&["list"])).unwrap(),
            ModerateAction::List
        );
    }

    #[test]
    fn moderate_changes_parse_into_content_changes() {
        assert_eq!(
            ModerateAction::parse(&words(&["add", "sentence", "2", "ბაბა", "აბა."])).unwrap(),
            ModerateAction::Change(ContentChange::Add {
                kind: ContentKind::Sentence,
                position: pos(2),
                content: "ბაბა აბა.".to_string(),
            })
        );
        assert_eq!(
            ModerateAction::parse(&words(&["update", "words", "1", "0", "ია"])).unwrap(),
            ModerateAction::Change(ContentChange::Update {
                kind: ContentKind::Word,
                position: pos(1),
                index: 0,
                content: "ია".to_string(),
            })
        );
        assert_eq!(
            ModerateAction::parse(&words(&["delete", "proverb", "3", "1"])).unwrap(),
            ModerateAction::Change(ContentChange::Delete {
                kind: ContentKind::Proverb,
                position: pos(3),
                index: 1,
            })
        );
    }

    #[test]
    fn moderate_reports_bad_arguments() {
        assert!(matches!(
            ModerateAction::parse(&words(&["add", "poem", "1", "x"])),
            Err(ArgsError::InvalidValue { what: "content kind", .. })
        ));
        assert!(matches!(
            ModerateAction::parse(&words(&["add", "word", "0", "x"])),
            Err(ArgsError::InvalidPosition { .. })
        ));
        assert!(matches!(
            ModerateAction::parse(&words(&["add", "word", "1"])),
            Err(ArgsError::MissingArgument { name: "text" })
        ));
        assert!(matches!(
            ModerateAction::parse(&words(&["delete", "word", "1", "last"])),
            Err(ArgsError::InvalidValue { what: "index", .. })
        ));
        assert!(matches!(
            ModerateAction::parse(&words(&["publish"])),
            Err(ArgsError::UnknownAction { command: "moderate", .. })
        ));
    }

    #[test]
    fn moderate_analysis_actions_keep_the_text() {
        assert_eq!(
            ModerateAction::parse(&words(&["detect", "მზე", "ანათებს"])).unwrap(),
            ModerateAction::Detect("მზე ანათებს".to_string())
        );
        assert_eq!(
            ModerateAction::parse(&words(&["check", "4", "ბაბა"])).unwrap(),
            ModerateAction::Check {
                position: pos(4),
                sentence: "ბაბა".to_string()
            }
        );
    }

    #[test]
    fn admin_actions_parse() {
        assert_eq!(AdminAction::parse(&[]).unwrap(), AdminAction::Users);
        assert_eq!(
            AdminAction::parse(&words(&["toggle", "7"])).unwrap(),
            AdminAction::Toggle(UserId::new(7))
        );
        assert_eq!(
            AdminAction::parse(&words(&["role", "7", "moder", "on"])).unwrap(),
            AdminAction::Role {
                id: UserId::new(7),
                flag: RoleFlag::Moderator,
                value: true
            }
        );
        assert_eq!(
            AdminAction::parse(&words(&["delete", "3"])).unwrap(),
            AdminAction::Delete(UserId::new(3))
        );
        assert_eq!(AdminAction::parse(&words(&["logs"])).unwrap(), AdminAction::Logs);
        assert_eq!(AdminAction::parse(&words(&["stats"])).unwrap(), AdminAction::Stats);
    }

    #[test]
    fn admin_rejects_bad_ids_and_roles() {
        assert!(matches!(
            AdminAction::parse(&words(&["toggle", "nino"])),
            Err(ArgsError::InvalidValue { what: "user id", .. })
        ));
        assert!(matches!(
            AdminAction::parse(&words(&["role", "7", "owner", "on"])),
            Err(ArgsError::InvalidValue { what: "role", .. })
        ));
        assert!(matches!(
            AdminAction::parse(&words(&["role", "7", "admin"])),
            Err(ArgsError::MissingArgument { name: "on|off" })
        ));
        assert!(matches!(
            AdminAction::parse(&words(&["ban", "7"])),
            Err(ArgsError::UnknownAction { command: "admin", .. })
        ));
    }

    #[test]
    fn kind_and_role_names() {
        assert_eq!(parse_kind("reading").unwrap(), ContentKind::Reading);
        assert_eq!(parse_kind("sentences").unwrap(), ContentKind::Sentence);
        assert_eq!(parse_role_filter("moder").unwrap(), RoleFilter::Moderator);
        assert!(parse_role_filter("owner").is_err());
    }
}
