//! Explicit command descriptor tree.
//!
//! Every command is a node in an arena; nodes refer to their parent and
//! children by index. Qualified names such as `ca-config-show` and usage lines
//! are derived by walking from a leaf back to the root, so no node needs a
//! back-reference into its owner.

use std::collections::BTreeMap;

use pki_instance::SubsystemKind;

pub(crate) const ROOT: usize = 0;
const PROGRAM: &str = "pki-server";

/// One command in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandNode {
    pub(crate) name: String,
    pub(crate) summary: String,
    pub(crate) children: BTreeMap<String, usize>,
    pub(crate) parent: Option<usize>,
}

/// Arena of command descriptors rooted at `pki-server`.
#[derive(Debug, Clone)]
pub(crate) struct CommandTree {
    nodes: Vec<CommandNode>,
}

impl CommandTree {
    /// Builds the tree describing every `pki-server` command.
    pub(crate) fn standard() -> Self {
        let mut tree = Self {
            nodes: vec![CommandNode {
                name: PROGRAM.to_owned(),
                summary: String::from("PKI server command-line interface"),
                children: BTreeMap::new(),
                parent: None,
            }],
        };

        for (name, summary) in [
            ("create", "Create PKI server"),
            ("remove", "Remove PKI server"),
            ("status", "Display PKI service status"),
            ("start", "Start PKI server"),
            ("stop", "Stop PKI server"),
            ("restart", "Restart PKI server"),
            ("run", "Run PKI server"),
        ] {
            tree.add(ROOT, name, summary);
        }

        for kind in SubsystemKind::ALL {
            let label = kind.label();
            let subsystem = tree.add(
                ROOT,
                kind.as_str(),
                &format!("{label} management commands"),
            );

            let config = tree.add(
                subsystem,
                "config",
                &format!("{label} configuration management commands"),
            );
            tree.add(config, "find", &format!("Find {label} configuration parameters"));
            tree.add(config, "show", &format!("Show {label} configuration parameter"));
            tree.add(config, "set", &format!("Set {label} configuration parameter"));
            tree.add(config, "unset", &format!("Unset {label} configuration parameter"));

            let group = tree.add(
                subsystem,
                "group",
                &format!("{label} group management commands"),
            );
            tree.add(group, "find", &format!("Find {label} groups"));
            let member = tree.add(
                group,
                "member",
                &format!("{label} group member management commands"),
            );
            tree.add(member, "find", &format!("Find {label} group members"));
            tree.add(member, "add", &format!("Add {label} group member"));
        }

        tree
    }

    fn add(&mut self, parent: usize, name: &str, summary: &str) -> usize {
        let index = self.nodes.len();
        self.nodes.push(CommandNode {
            name: name.to_owned(),
            summary: summary.to_owned(),
            children: BTreeMap::new(),
            parent: Some(parent),
        });
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.insert(name.to_owned(), index);
        }
        index
    }

    /// Node at `index`.
    pub(crate) fn node(&self, index: usize) -> Option<&CommandNode> {
        self.nodes.get(index)
    }

    /// Resolves a command path such as `["ca", "config", "show"]`.
    pub(crate) fn lookup<'a, I>(&self, path: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        path.into_iter().try_fold(ROOT, |index, segment| {
            self.node(index)?.children.get(segment).copied()
        })
    }

    /// Hyphen-joined name of `index` without the program name, e.g. `ca-config-show`.
    pub(crate) fn qualified_name(&self, index: usize) -> String {
        let mut segments: Vec<&str> = Vec::new();
        let mut cursor = Some(index);
        while let Some(current) = cursor {
            let Some(node) = self.node(current) else {
                break;
            };
            if node.parent.is_none() {
                break;
            }
            segments.push(node.name.as_str());
            cursor = node.parent;
        }
        segments.reverse();
        segments.join("-")
    }

    /// Usage line printed alongside argument errors.
    pub(crate) fn usage(&self, index: usize) -> String {
        let qualified = self.qualified_name(index);
        if qualified.is_empty() {
            format!("Usage: {PROGRAM} [OPTIONS]")
        } else {
            format!("Usage: {PROGRAM} {qualified} [OPTIONS]")
        }
    }

    /// One-line summary of `index`.
    pub(crate) fn summary(&self, index: usize) -> Option<&str> {
        self.node(index).map(|node| node.summary.as_str())
    }
}
