//! Assembly of a comment tree from partial listings.
//!
//! Reddit returns comment trees in pieces: the initial listing plus `more`
//! placeholders that must be fetched separately. Every fetched comment
//! carries its parent's fullname, so pieces are stored flat and linked back
//! into a tree once no placeholders remain.

use std::collections::{HashMap, HashSet, VecDeque};

use super::models::{Comment, CommentThing, CommentTree};

/// A placeholder for comments that were not included in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MoreStub {
    pub parent_id: String,
    /// Base-36 ids of the missing comments. Empty for "continue this thread"
    /// links, which must be fetched as a sub-thread of the parent.
    pub children: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct TreeAssembler {
    root: String,
    comments: HashMap<String, Comment>,
    children: HashMap<String, Vec<String>>,
    seen: HashSet<String>,
    pending: VecDeque<MoreStub>,
    expanded: HashSet<MoreStub>,
}

impl TreeAssembler {
    /// Create an assembler for the post with the given fullname.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            comments: HashMap::new(),
            children: HashMap::new(),
            seen: HashSet::new(),
            pending: VecDeque::new(),
            expanded: HashSet::new(),
        }
    }

    /// Add listing entries. `parent` is used for entries that do not name
    /// their own parent.
    pub fn ingest(&mut self, parent: &str, things: Vec<CommentThing>) {
        for thing in things {
            match thing {
                CommentThing::Comment(raw) => {
                    let name = raw.fullname();
                    if !self.seen.insert(name.clone()) {
                        continue;
                    }
                    let parent_id = raw
                        .parent_id
                        .clone()
                        .unwrap_or_else(|| parent.to_string());
                    let (comment, replies) = raw.into_parts();
                    self.children
                        .entry(parent_id)
                        .or_default()
                        .push(name.clone());
                    self.comments.insert(name.clone(), comment);
                    self.ingest(&name, replies);
                }
                CommentThing::More(more) => {
                    let parent_id = more.parent_id.unwrap_or_else(|| parent.to_string());
                    // A bare placeholder on the post itself has nothing to expand.
                    if more.children.is_empty() && parent_id == self.root {
                        continue;
                    }
                    self.pending.push_back(MoreStub {
                        parent_id,
                        children: more.children,
                    });
                }
            }
        }
    }

    /// Add the replies of `parent` from a sub-thread listing whose top entry
    /// is `parent` itself.
    pub fn ingest_subthread(&mut self, parent: &str, things: Vec<CommentThing>) {
        for thing in things {
            if let CommentThing::Comment(raw) = thing {
                if raw.fullname() == parent {
                    let (_, replies) = raw.into_parts();
                    self.ingest(parent, replies);
                }
            }
        }
    }

    /// Take the next unexpanded placeholder.
    ///
    /// A placeholder is handed out once. Repeats of it in later responses
    /// are dropped, so expansion always terminates.
    pub fn next_pending(&mut self) -> Option<MoreStub> {
        while let Some(stub) = self.pending.pop_front() {
            if self.expanded.insert(stub.clone()) {
                return Some(stub);
            }
        }
        None
    }

    /// Link the collected comments into a tree.
    pub fn finish(mut self) -> CommentTree {
        let root = self.root.clone();
        CommentTree::new(self.take_children(&root))
    }

    fn take_children(&mut self, parent: &str) -> Vec<Comment> {
        let names = self.children.remove(parent).unwrap_or_default();
        names
            .into_iter()
            .filter_map(|name| {
                let mut comment = self.comments.remove(&name)?;
                comment.replies = self.take_children(&name);
                Some(comment)
            })
            .collect()
    }
}
