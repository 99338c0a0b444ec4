use anyhow::{Context, Result, anyhow};

use crate::catalog::{self, Project};

pub fn list(category: Option<&str>, json: bool) -> Result<()> {
    let projects: Vec<&Project> = match category {
        Some(category) => catalog::by_category(category),
        None => catalog::all().iter().collect(),
    };

    if json {
        let out = serde_json::to_string_pretty(&projects).context("failed to encode catalog")?;
        println!("{out}");
        return Ok(());
    }

    for project in projects {
        println!("{}", summary(project));
    }
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let project = catalog::find(id).ok_or_else(|| anyhow!("project not found: id={id}"))?;
    for line in details(project) {
        println!("{line}");
    }
    Ok(())
}

fn summary(project: &Project) -> String {
    format!(
        "#{} {} by {} [{}] likes={} cokes={}",
        project.id, project.title, project.author, project.category, project.likes, project.cokes
    )
}

fn details(project: &Project) -> Vec<String> {
    vec![
        format!("{} by {}", project.title, project.author),
        format!("category: {}", project.category),
        format!("tags: {}", project.tags.join(", ")),
        project.description.to_string(),
        format!("likes={} cokes={}", project.likes, project.cokes),
        format!("next: tip --project {} --recipient <ADDRESS> --amount 5", project.id),
    ]
}
