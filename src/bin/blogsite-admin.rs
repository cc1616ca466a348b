use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use blogsite::{
    content::{PostStatus, slugify},
    error::Result,
    storage::{self, DBPool, NewPost, Querier, Store},
};

const USAGE: &str = "\
Usage: blogsite-admin <command> [args]

Commands:
  migrate <sql_file>
  create-user <username>
  delete-user <user_id>
  create-post <author_id> <title> <content_file> [--publish]
  publish <slug>
  unpublish <slug>
  delete-post <slug>
  set-about <title> <content_file>
  approve-comment <comment_id>
  create-event <name> <location> <YYYY-MM-DD HH:MM>
  delete-event <event_id>
  issue-ticket <event_id> <user_id>
  list-events
  list-tickets <user_id>
  list-requests";

fn print_usage_and_exit() -> ! {
    eprintln!("{USAGE}");
    std::process::exit(1);
}

#[derive(Debug, PartialEq)]
enum Command {
    Migrate(String),
    CreateUser(String),
    DeleteUser(i64),
    CreatePost {
        author_id: i64,
        title: String,
        content_file: String,
        publish: bool,
    },
    SetStatus(String, PostStatus),
    DeletePost(String),
    SetAbout {
        title: String,
        content_file: String,
    },
    ApproveComment(i64),
    CreateEvent {
        name: String,
        location: String,
        date: DateTime<Local>,
    },
    DeleteEvent(i64),
    IssueTicket {
        event_id: i64,
        user_id: i64,
    },
    ListEvents,
    ListTickets(i64),
    ListRequests,
}

fn parse_id(s: &str) -> std::result::Result<i64, String> {
    s.parse().map_err(|_| format!("Invalid id: {s}"))
}

fn parse_local(s: &str) -> std::result::Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .map_err(|_| format!("Invalid date: {s}"))?;
    Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| format!("Ambiguous local time: {s}"))
}

fn parse_args(args: &[String]) -> std::result::Result<Command, String> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let cmd = match args.as_slice() {
        ["migrate", file] => Command::Migrate(file.to_string()),
        ["create-user", username] => Command::CreateUser(username.to_string()),
        ["delete-user", id] => Command::DeleteUser(parse_id(id)?),
        ["create-post", author_id, title, content_file, rest @ ..] => {
            let publish = match rest {
                [] => false,
                ["--publish"] => true,
                _ => return Err("Unexpected arguments after <content_file>".to_string()),
            };
            if slugify(title).is_empty() {
                return Err(format!("Title has no usable slug characters: {title}"));
            }
            Command::CreatePost {
                author_id: parse_id(author_id)?,
                title: title.to_string(),
                content_file: content_file.to_string(),
                publish,
            }
        }
        ["publish", slug] => Command::SetStatus(slug.to_string(), PostStatus::Published),
        ["unpublish", slug] => Command::SetStatus(slug.to_string(), PostStatus::Draft),
        ["delete-post", slug] => Command::DeletePost(slug.to_string()),
        ["set-about", title, content_file] => Command::SetAbout {
            title: title.to_string(),
            content_file: content_file.to_string(),
        },
        ["approve-comment", id] => Command::ApproveComment(parse_id(id)?),
        ["create-event", name, location, date] => Command::CreateEvent {
            name: name.to_string(),
            location: location.to_string(),
            date: parse_local(date)?,
        },
        ["delete-event", id] => Command::DeleteEvent(parse_id(id)?),
        ["issue-ticket", event_id, user_id] => Command::IssueTicket {
            event_id: parse_id(event_id)?,
            user_id: parse_id(user_id)?,
        },
        ["list-events"] => Command::ListEvents,
        ["list-tickets", user_id] => Command::ListTickets(parse_id(user_id)?),
        ["list-requests"] => Command::ListRequests,
        [] => return Err("Missing <command>".to_string()),
        [other, ..] => return Err(format!("Unknown command or wrong arguments: {other}")),
    };

    Ok(cmd)
}

/// 打印命中与否，未命中时以非零状态退出
fn report(hit: bool, what: &str) {
    if hit {
        println!("{what}");
    } else {
        eprintln!("Not found");
        std::process::exit(1);
    }
}

async fn execute(pool: &DBPool, cmd: Command) -> Result<()> {
    match cmd {
        Command::Migrate(file) => {
            storage::migrate(pool, &file).await?;
            println!("Migrated {file}");
        }
        Command::CreateUser(username) => {
            let user = pool.create_user(&username).await?;
            println!("Created user {} ({})", user.username, user.id);
        }
        Command::DeleteUser(id) => {
            report(pool.delete_user(id).await?, "Deleted user");
        }
        Command::CreatePost {
            author_id,
            title,
            content_file,
            publish,
        } => {
            let content = std::fs::read_to_string(&content_file)?;
            let post = NewPost {
                slug: slugify(&title),
                title,
                author_id,
                content,
                excerpt: String::new(),
                featured_image: None,
                status: if publish {
                    PostStatus::Published
                } else {
                    PostStatus::Draft
                },
            };
            let id = pool.create_post(&post).await?;
            if let Some(post) = pool.post(&post.slug).await? {
                println!("Created post {id}: {post}");
            }
        }
        Command::SetStatus(slug, status) => {
            report(
                pool.set_post_status(&slug, status).await?,
                "Updated post status",
            );
        }
        Command::DeletePost(slug) => {
            report(pool.delete_post(&slug).await?, "Deleted post");
        }
        Command::SetAbout {
            title,
            content_file,
        } => {
            let content = std::fs::read_to_string(&content_file)?;
            let id = pool.insert_about(&title, &content).await?;
            println!("Saved about page {id}");
        }
        Command::ApproveComment(id) => {
            report(pool.approve_comment(id).await?, "Approved comment");
        }
        Command::CreateEvent {
            name,
            location,
            date,
        } => {
            let id = pool.create_event(&name, &location, date).await?;
            println!("Created event {id}: {name}");
        }
        Command::DeleteEvent(id) => {
            report(pool.delete_event(id).await?, "Deleted event");
        }
        Command::IssueTicket { event_id, user_id } => {
            let id = pool.issue_ticket(event_id, user_id).await?;
            println!("Issued ticket {id}");
        }
        Command::ListEvents => {
            for event in pool.events().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    event.id,
                    event,
                    event.location,
                    event.date.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::ListTickets(user_id) => {
            for ticket in pool.tickets_of(user_id).await? {
                println!("{}\t{}\t{}", ticket.id, ticket.event_name, ticket);
            }
        }
        Command::ListRequests => {
            for req in pool.collaborate_requests().await? {
                println!(
                    "{}\t{}\t<{}>\t{}\t{}",
                    req.id,
                    req.name,
                    req.email,
                    req.created_on.format("%Y-%m-%d %H:%M"),
                    req.message.lines().next().unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    blogsite::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("{e}");
        print_usage_and_exit();
    });

    let result = match storage::init_db_from_env().await {
        Ok(pool) => execute(&pool, cmd).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_create_post() {
        let cmd = parse_args(&args(&["create-post", "1", "Hello World", "post.html"])).unwrap();
        assert_eq!(
            cmd,
            Command::CreatePost {
                author_id: 1,
                title: "Hello World".to_string(),
                content_file: "post.html".to_string(),
                publish: false,
            }
        );

        let cmd = parse_args(&args(&[
            "create-post",
            "1",
            "Hello",
            "post.html",
            "--publish",
        ]))
        .unwrap();
        assert!(matches!(cmd, Command::CreatePost { publish: true, .. }));
    }

    #[test]
    fn test_parse_status_commands() {
        assert_eq!(
            parse_args(&args(&["publish", "hello"])).unwrap(),
            Command::SetStatus("hello".to_string(), PostStatus::Published)
        );
        assert_eq!(
            parse_args(&args(&["unpublish", "hello"])).unwrap(),
            Command::SetStatus("hello".to_string(), PostStatus::Draft)
        );
    }

    #[test]
    fn test_parse_create_event_date() {
        let cmd = parse_args(&args(&[
            "create-event",
            "RustConf",
            "Montreal",
            "2024-09-10 09:30",
        ]))
        .unwrap();
        let Command::CreateEvent { date, .. } = cmd else {
            panic!("expected CreateEvent");
        };
        assert_eq!(date.format("%Y-%m-%d %H:%M").to_string(), "2024-09-10 09:30");
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&[]).is_err());
        assert!(parse_args(&args(&["approve-comment", "x"])).is_err());
        assert!(parse_args(&args(&["create-event", "a", "b", "tomorrow"])).is_err());
        assert!(parse_args(&args(&["create-post", "1", "t", "f", "--draft"])).is_err());
        assert!(parse_args(&args(&["nope"])).is_err());
        assert!(parse_args(&args(&["delete-event", "one"])).is_err());
    }

    #[test]
    fn test_parse_delete_event() {
        assert_eq!(
            parse_args(&args(&["delete-event", "7"])).unwrap(),
            Command::DeleteEvent(7)
        );
    }

    #[test]
    fn test_parse_create_post_rejects_empty_slug() {
        let err = parse_args(&args(&["create-post", "1", "中文标题", "post.html"])).unwrap_err();
        assert!(err.contains("slug"), "{err}");
        assert!(parse_args(&args(&["create-post", "1", "!!!", "post.html"])).is_err());
    }
}
