//! Husbandry guides compiled into the binary.
//!
//! Each `articles/<slug>.md` file becomes one article; its first `# ` heading
//! is the title.

use crate::core::error::CluckError;
use crate::core::output::{self, OutputFormat};
use clap::{Parser, Subcommand};
use rust_embed::RustEmbed;
use serde::Serialize;

#[derive(RustEmbed)]
#[folder = "articles/"]
#[include = "*.md"]
struct ArticleAssets;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Article {
    pub slug: String,
    pub title: String,
    pub body: String,
}

fn parse_article(slug: &str, raw: &str) -> Article {
    let mut title = slug.to_string();
    let mut body_lines = Vec::new();
    let mut seen_title = false;
    for line in raw.lines() {
        if !seen_title {
            if let Some(heading) = line.strip_prefix("# ") {
                title = heading.trim().to_string();
                seen_title = true;
                continue;
            }
        }
        body_lines.push(line);
    }
    Article {
        slug: slug.to_string(),
        title,
        body: body_lines.join("\n").trim().to_string(),
    }
}

pub fn get_article(slug: &str) -> Option<Article> {
    let file = ArticleAssets::get(&format!("{}.md", slug))?;
    let raw = String::from_utf8_lossy(&file.data);
    Some(parse_article(slug, &raw))
}

/// All embedded articles, ordered by slug.
pub fn list_articles() -> Vec<Article> {
    let mut slugs: Vec<String> = ArticleAssets::iter()
        .filter_map(|path| path.strip_suffix(".md").map(str::to_string))
        .collect();
    slugs.sort();
    slugs.iter().filter_map(|slug| get_article(slug)).collect()
}

#[derive(Parser, Debug)]
#[clap(name = "articles", about = "Read the built-in husbandry guides.")]
pub struct ArticlesCli {
    #[clap(subcommand)]
    pub command: ArticlesCommand,
}

#[derive(Subcommand, Debug)]
pub enum ArticlesCommand {
    /// List article slugs and titles.
    List,
    /// Print one article.
    Show {
        #[clap(value_name = "SLUG")]
        slug: String,
    },
}

pub fn run_articles_cli(cli: ArticlesCli, format: OutputFormat) -> Result<(), CluckError> {
    use colored::Colorize;

    match cli.command {
        ArticlesCommand::List => {
            let articles = list_articles();
            match format {
                OutputFormat::Json => {
                    let index: Vec<_> = articles
                        .iter()
                        .map(|a| serde_json::json!({ "slug": a.slug, "title": a.title }))
                        .collect();
                    output::print_json(&index)?;
                }
                OutputFormat::Text => {
                    for a in &articles {
                        println!("{:<22} {}", a.slug.bright_cyan(), a.title);
                    }
                }
            }
        }
        ArticlesCommand::Show { slug } => {
            let article = get_article(&slug)
                .ok_or_else(|| CluckError::NotFound(format!("article '{}'", slug)))?;
            match format {
                OutputFormat::Json => output::print_json(&article)?,
                OutputFormat::Text => {
                    println!("{}", article.title.bright_yellow().bold());
                    println!();
                    println!("{}", article.body);
                }
            }
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "articles",
        "version": "0.1.0",
        "description": "Read-only husbandry guides embedded at build time",
        "commands": [
            { "name": "articles list" },
            { "name": "articles show", "parameters": ["slug"] }
        ],
        "storage": []
    })
}
