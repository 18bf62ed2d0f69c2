//! # Tokenizer Registry
//!
//! Recognizers are registered once through [`RegistryBuilder`]. Building
//! reads each recognizer's declared hooks a single time and files it into
//! the lifecycle phases it takes part in:
//!
//! - a priority-ordered list per phase (stable for equal priority)
//! - a type → recognizer map for parse dispatch
//! - one fallback per domain, always consulted last
//!
//! The resulting [`Registry`] is immutable and shared read-only by every
//! parse that uses it.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{debug, warn};

use crate::{
    ast::NodeType,
    error::{Error, Result},
};

use super::{
    blocks::recognizer::{BlockHooks, BlockRecognizer},
    inline::recognizer::{InlineHooks, InlineRecognizer},
};

/// Lifecycle phase a recognizer is filed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Match,
    PostMatch,
    Parse,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Match => "match",
            Phase::PostMatch => "post-match",
            Phase::Parse => "parse",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Block,
    Inline,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Domain::Block => "block",
            Domain::Inline => "inline",
        })
    }
}

/// Inline recognizers sharing one priority. Their delimiters are collected
/// and paired together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    pub priority: i32,
    pub members: Vec<usize>,
}

pub struct Registry {
    blocks: Vec<Box<dyn BlockRecognizer>>,
    block_hooks: Vec<BlockHooks>,
    block_fallback: usize,
    block_match: Vec<usize>,
    block_post: Vec<usize>,
    block_meta: Vec<usize>,
    block_parsers: HashMap<NodeType, usize>,

    inlines: Vec<Box<dyn InlineRecognizer>>,
    inline_hooks: Vec<InlineHooks>,
    inline_fallback: usize,
    inline_tiers: Vec<Tier>,
    inline_parsers: HashMap<NodeType, usize>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn block(&self, index: usize) -> &dyn BlockRecognizer {
        self.blocks[index].as_ref()
    }

    pub fn block_hooks(&self, index: usize) -> BlockHooks {
        self.block_hooks[index]
    }

    pub fn block_fallback(&self) -> usize {
        self.block_fallback
    }

    /// Match-phase recognizers in priority order (fallback excluded).
    pub fn block_match(&self) -> &[usize] {
        &self.block_match
    }

    pub fn block_post_match(&self) -> &[usize] {
        &self.block_post
    }

    pub fn block_meta(&self) -> &[usize] {
        &self.block_meta
    }

    pub fn block_parser(&self, node_type: &str) -> Option<usize> {
        self.block_parsers.get(node_type).copied()
    }

    pub fn inline(&self, index: usize) -> &dyn InlineRecognizer {
        self.inlines[index].as_ref()
    }

    pub fn inline_hooks(&self, index: usize) -> InlineHooks {
        self.inline_hooks[index]
    }

    pub fn inline_fallback(&self) -> usize {
        self.inline_fallback
    }

    /// Scanning tiers in descending priority (fallback excluded).
    pub fn inline_tiers(&self) -> &[Tier] {
        &self.inline_tiers
    }

    pub fn inline_parser(&self, node_type: &str) -> Option<usize> {
        self.inline_parsers.get(node_type).copied()
    }

    /// Names of all registered recognizers, blocks first.
    pub fn names(&self) -> Vec<&'static str> {
        self.blocks
            .iter()
            .map(|r| r.name())
            .chain(self.inlines.iter().map(|r| r.name()))
            .collect()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("blocks", &self.blocks.iter().map(|r| r.name()).collect::<Vec<_>>())
            .field("inlines", &self.inlines.iter().map(|r| r.name()).collect::<Vec<_>>())
            .field("inline_tiers", &self.inline_tiers)
            .finish()
    }
}

/// Collects recognizers and builds a [`Registry`].
///
/// Registering two recognizers for the same node type in one phase is a
/// configuration error. By default the later registration wins and a warning
/// is logged; in strict mode [`RegistryBuilder::build`] fails instead.
#[derive(Default)]
pub struct RegistryBuilder {
    strict: bool,
    blocks: Vec<Box<dyn BlockRecognizer>>,
    block_fallback: Option<Box<dyn BlockRecognizer>>,
    inlines: Vec<Box<dyn InlineRecognizer>>,
    inline_fallback: Option<Box<dyn InlineRecognizer>>,
    disabled: HashSet<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn register_block(mut self, recognizer: impl BlockRecognizer + 'static) -> Self {
        self.blocks.push(Box::new(recognizer));
        self
    }

    pub fn register_inline(mut self, recognizer: impl InlineRecognizer + 'static) -> Self {
        self.inlines.push(Box::new(recognizer));
        self
    }

    pub fn block_fallback(mut self, recognizer: impl BlockRecognizer + 'static) -> Self {
        self.block_fallback = Some(Box::new(recognizer));
        self
    }

    pub fn inline_fallback(mut self, recognizer: impl InlineRecognizer + 'static) -> Self {
        self.inline_fallback = Some(Box::new(recognizer));
        self
    }

    /// Leaves the named recognizer out of the built registry. Fallbacks
    /// cannot be disabled.
    pub fn disable(mut self, name: impl Into<String>) -> Self {
        self.disabled.insert(name.into());
        self
    }

    pub fn build(self) -> Result<Registry> {
        let Self {
            strict,
            blocks,
            block_fallback,
            inlines,
            inline_fallback,
            disabled,
        } = self;

        let block_fallback = block_fallback.ok_or(Error::MissingFallback {
            domain: Domain::Block,
        })?;
        let inline_fallback = inline_fallback.ok_or(Error::MissingFallback {
            domain: Domain::Inline,
        })?;
        for name in [block_fallback.name(), inline_fallback.name()] {
            if disabled.contains(name) {
                warn!("fallback recognizer `{name}` cannot be disabled");
            }
        }

        let mut blocks: Vec<_> = blocks
            .into_iter()
            .filter(|r| !disabled.contains(r.name()))
            .collect();
        blocks.push(block_fallback);
        let block_fallback = blocks.len() - 1;
        let block_hooks: Vec<_> = blocks.iter().map(|r| r.hooks()).collect();

        let mut inlines: Vec<_> = inlines
            .into_iter()
            .filter(|r| !disabled.contains(r.name()))
            .collect();
        inlines.push(inline_fallback);
        let inline_fallback = inlines.len() - 1;
        let inline_hooks: Vec<_> = inlines.iter().map(|r| r.hooks()).collect();

        let block_types = |i: usize| blocks[i].node_types();
        let block_name = |i: usize| blocks[i].name();
        let with_block_hook = |hook: BlockHooks| {
            (0..blocks.len())
                .filter(|&i| i != block_fallback && block_hooks[i].intersects(hook))
                .collect::<Vec<_>>()
        };

        let (mut block_match, _) = file_phase(
            Phase::Match,
            strict,
            &with_block_hook(BlockHooks::MATCH),
            block_types,
            block_name,
        )?;
        let (mut block_post, _) = file_phase(
            Phase::PostMatch,
            strict,
            &with_block_hook(BlockHooks::TRANSFORM_SIBLINGS),
            block_types,
            block_name,
        )?;
        let mut block_meta = with_block_hook(BlockHooks::PARSE_META);
        let block_parse: Vec<_> = (0..blocks.len())
            .filter(|&i| block_hooks[i].contains(BlockHooks::PARSE))
            .collect();
        let (_, block_parsers) =
            file_phase(Phase::Parse, strict, &block_parse, block_types, block_name)?;

        for list in [&mut block_match, &mut block_post, &mut block_meta] {
            list.sort_by_key(|&i| Reverse(blocks[i].priority()));
        }

        let inline_types = |i: usize| inlines[i].node_types();
        let inline_name = |i: usize| inlines[i].name();
        let scanning: Vec<_> = (0..inlines.len())
            .filter(|&i| i != inline_fallback && inline_hooks[i].contains(InlineHooks::SCAN))
            .collect();
        let (mut scanning, _) =
            file_phase(Phase::Match, strict, &scanning, inline_types, inline_name)?;
        let inline_parse: Vec<_> = (0..inlines.len())
            .filter(|&i| inline_hooks[i].contains(InlineHooks::PARSE))
            .collect();
        let (_, inline_parsers) =
            file_phase(Phase::Parse, strict, &inline_parse, inline_types, inline_name)?;

        scanning.sort_by_key(|&i| Reverse(inlines[i].priority()));
        let mut inline_tiers: Vec<Tier> = Vec::new();
        for i in scanning {
            let priority = inlines[i].priority();
            match inline_tiers.last_mut() {
                Some(tier) if tier.priority == priority => tier.members.push(i),
                _ => inline_tiers.push(Tier {
                    priority,
                    members: vec![i],
                }),
            }
        }

        debug!(
            "registry built: {} block matchers, {} post-match, {} meta, {} inline tiers{}",
            block_match.len(),
            block_post.len(),
            block_meta.len(),
            inline_tiers.len(),
            if strict { " (strict)" } else { "" }
        );

        Ok(Registry {
            blocks,
            block_hooks,
            block_fallback,
            block_match,
            block_post,
            block_meta,
            block_parsers,
            inlines,
            inline_hooks,
            inline_fallback,
            inline_tiers,
            inline_parsers,
        })
    }
}

/// Files `candidates` (in registration order) into one phase.
///
/// Returns the surviving members and the node type → recognizer map. A
/// recognizer whose node type is claimed again by a later one leaves the
/// phase.
fn file_phase<'a>(
    phase: Phase,
    strict: bool,
    candidates: &[usize],
    types_of: impl Fn(usize) -> &'a [NodeType],
    name_of: impl Fn(usize) -> &'static str,
) -> Result<(Vec<usize>, HashMap<NodeType, usize>)> {
    let mut owners: HashMap<NodeType, usize> = HashMap::new();
    let mut replaced: HashSet<usize> = HashSet::new();

    for &i in candidates {
        for &node_type in types_of(i) {
            match owners.insert(node_type, i) {
                Some(prev) if prev != i => {
                    if strict {
                        return Err(Error::DuplicateNodeType {
                            phase,
                            node_type: node_type.to_string(),
                        });
                    }
                    warn!(
                        "node type `{node_type}` registered twice in the {phase} phase: `{}` replaces `{}`",
                        name_of(i),
                        name_of(prev)
                    );
                    replaced.insert(prev);
                }
                _ => {}
            }
        }
    }

    owners.retain(|_, owner| !replaced.contains(owner));
    let members = candidates
        .iter()
        .copied()
        .filter(|i| !replaced.contains(i))
        .collect();
    Ok((members, owners))
}
