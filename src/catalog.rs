use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
    pub title: &'static str,
    pub author: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub likes: u32,
    pub cokes: u32,
    pub color: &'static str,
}

static PROJECTS: &[Project] = &[
    Project {
        id: 1,
        title: "ZetaScan Pro",
        author: "0xDev...88",
        category: "Tooling",
        description: "Open-source explorer for tracing cross-chain transactions and debugging omnichain contracts.",
        tags: &["Explorer", "Open Source"],
        likes: 128,
        cokes: 450,
        color: "from-blue-500 to-cyan-400",
    },
    Project {
        id: 2,
        title: "Pixel RPG Assets",
        author: "Art4Game",
        category: "Design",
        description: "Free commercial-use pixel art pack with 500+ character animations and tiles.",
        tags: &["GameDev", "CC0"],
        likes: 856,
        cokes: 1200,
        color: "from-purple-500 to-pink-500",
    },
    Project {
        id: 3,
        title: "Rust Learning Path",
        author: "Rustacean",
        category: "Education",
        description: "Interactive Rust tutorial for Web3 developers, starting from zero.",
        tags: &["Education", "Rust"],
        likes: 2300,
        cokes: 5600,
        color: "from-orange-500 to-red-500",
    },
    Project {
        id: 4,
        title: "Omni-DAO Template",
        author: "DAO_Wizard",
        category: "Smart Contract",
        description: "Deploy cross-chain DAO governance in one line, with multi-chain voting.",
        tags: &["DAO", "Solidity"],
        likes: 445,
        cokes: 890,
        color: "from-emerald-500 to-teal-500",
    },
];

pub fn all() -> &'static [Project] {
    PROJECTS
}

pub fn find(id: i64) -> Option<&'static Project> {
    PROJECTS.iter().find(|p| p.id == id)
}

pub fn by_category(category: &str) -> Vec<&'static Project> {
    PROJECTS
        .iter()
        .filter(|p| p.category.eq_ignore_ascii_case(category))
        .collect()
}
