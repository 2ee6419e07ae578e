//! Family-relationship resolution engine.
//!
//! Given a target member, walks household, parent/child, and marriage edges
//! to compute the complete set of members displayed as that person's family.
//! Both public variants run through the same engine, parameterised by
//! [`ResolverOptions`]:
//!
//! - `household()` is the compact view: the target's household, its parents,
//!   one hop of descendants (which also surfaces married-out children and
//!   siblings reachable through a shared parent).
//! - `tree(depth)` is the tree view: deeper descendant expansion, an ancestor
//!   pass over everything in scope, and the target's in-laws.
//!
//! Every Active marriage touching the accumulated set pulls in its opposite
//! party, and both parties' in-memory spouse links are overwritten from the
//! marriage record. The member field is a cache that can drift; the marriage
//! store is the source of truth.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, MemberKey};
use crate::domain::member::Member;
use crate::ports::{MarriageStore, MemberStore};

/// Knobs for the resolution walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// How many parent-to-child hops to expand (minimum 1).
    pub descendant_depth: u32,
    /// Fetch missing parents for every member in scope, not just the seed set.
    pub ancestors_for_all: bool,
    /// Pull in the target's spouse's parents.
    pub include_spouse_parents: bool,
}

impl ResolverOptions {
    /// The compact household view.
    pub fn household() -> Self {
        Self {
            descendant_depth: 1,
            ancestors_for_all: false,
            include_spouse_parents: false,
        }
    }

    /// The tree view. Depth is clamped to at least two hops so grandchildren
    /// of the household (children of a married-out daughter) stay visible.
    pub fn tree(descendant_depth: u32) -> Self {
        Self {
            descendant_depth: descendant_depth.max(2),
            ancestors_for_all: true,
            include_spouse_parents: true,
        }
    }
}

/// First-seen-wins member accumulator preserving discovery order.
struct Accumulator {
    order: Vec<MemberKey>,
    members: HashMap<MemberKey, Member>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            members: HashMap::new(),
        }
    }

    /// Adds a member unless already present; returns true when added.
    fn add(&mut self, member: Member) -> bool {
        let key = *member.key();
        if self.members.contains_key(&key) {
            return false;
        }
        self.order.push(key);
        self.members.insert(key, member);
        true
    }

    fn contains(&self, key: &MemberKey) -> bool {
        self.members.contains_key(key)
    }

    fn get(&self, key: &MemberKey) -> Option<&Member> {
        self.members.get(key)
    }

    fn get_mut(&mut self, key: &MemberKey) -> Option<&mut Member> {
        self.members.get_mut(key)
    }

    fn keys(&self) -> Vec<MemberKey> {
        self.order.clone()
    }

    /// Parent keys referenced by the accumulated members but not yet present.
    fn missing_parent_keys(&self) -> Vec<MemberKey> {
        let mut missing = Vec::new();
        for key in &self.order {
            let member = &self.members[key];
            for parent in [member.father(), member.mother()].into_iter().flatten() {
                if !self.members.contains_key(parent) && !missing.contains(parent) {
                    missing.push(*parent);
                }
            }
        }
        missing
    }

    fn into_vec(mut self) -> Vec<Member> {
        self.order
            .iter()
            .filter_map(|key| self.members.remove(key))
            .collect()
    }
}

/// The resolution engine.
pub struct FamilyResolver {
    members: Arc<dyn MemberStore>,
    marriages: Arc<dyn MarriageStore>,
}

impl FamilyResolver {
    pub fn new(members: Arc<dyn MemberStore>, marriages: Arc<dyn MarriageStore>) -> Self {
        Self { members, marriages }
    }

    /// Resolves the visible family set for a member.
    ///
    /// The returned records are in-memory copies: spouse links injected in the
    /// final step are never persisted here.
    pub async fn resolve(
        &self,
        target: &Member,
        options: &ResolverOptions,
    ) -> Result<Vec<Member>, DomainError> {
        let mut acc = Accumulator::new();

        // 1. Core household. An unassigned family collapses to the singleton.
        if target.family_id().is_assigned() {
            for member in self.members.find_by_family(target.family_id()).await? {
                acc.add(member);
            }
        }
        acc.add(target.clone());

        // 2. Parents of the seed set. These anchor the sibling expansion below
        // and give a married-out member a path back to the birth family.
        let seed_parents = acc.missing_parent_keys();
        for member in self.members.find_by_keys(&seed_parents).await? {
            acc.add(member);
        }

        // 3. Descendant expansion. The first frontier is household plus
        // parents, so hop one finds married-out children and siblings that
        // live under another family id; hop two finds their children.
        let mut frontier = acc.keys();
        for _ in 0..options.descendant_depth {
            if frontier.is_empty() {
                break;
            }
            let children = self.members.find_children_of(&frontier).await?;
            let mut next = Vec::new();
            for child in children {
                let key = *child.key();
                if acc.add(child) {
                    next.push(key);
                }
            }
            frontier = next;
        }

        // 4. Ancestor pass over everything accumulated so far.
        if options.ancestors_for_all {
            let missing = acc.missing_parent_keys();
            for member in self.members.find_by_keys(&missing).await? {
                acc.add(member);
            }
        }

        // 5. The target's in-laws: spouse's parents.
        if options.include_spouse_parents {
            self.include_spouse_parents(target, &mut acc).await?;
        }

        // 6. Marriage resolution across the whole accumulated set.
        let marriages = self.marriages.find_active_touching(&acc.keys()).await?;
        let mut missing_partners = Vec::new();
        for marriage in &marriages {
            for key in [marriage.husband(), marriage.wife()] {
                if !acc.contains(key) && !missing_partners.contains(key) {
                    missing_partners.push(*key);
                }
            }
        }
        for member in self.members.find_by_keys(&missing_partners).await? {
            acc.add(member);
        }

        // 7. Spouse-link injection from the canonical marriage records,
        // applied uniformly no matter which step found the record.
        for marriage in &marriages {
            let husband = *marriage.husband();
            let wife = *marriage.wife();
            if husband == wife {
                continue;
            }
            let wife_name = acc.get(&wife).map(|m| m.full_name().to_string());
            let husband_name = acc.get(&husband).map(|m| m.full_name().to_string());
            if let (Some(member), Some(name)) = (acc.get_mut(&husband), wife_name) {
                member.link_spouse(wife, name)?;
            }
            if let (Some(member), Some(name)) = (acc.get_mut(&wife), husband_name) {
                member.link_spouse(husband, name)?;
            }
        }

        Ok(acc.into_vec())
    }

    async fn include_spouse_parents(
        &self,
        target: &Member,
        acc: &mut Accumulator,
    ) -> Result<(), DomainError> {
        // The marriage store is canonical; the cached link is only a fallback.
        let spouse_key = match self.marriages.find_active_for(target.key()).await? {
            Some(marriage) => marriage.partner_of(target.key()).ok_or_else(|| {
                DomainError::new(
                    ErrorCode::InternalError,
                    "Active marriage does not involve its own member",
                )
            })?,
            None => match target.spouse() {
                Some(key) => *key,
                None => return Ok(()),
            },
        };

        let spouse = match acc.get(&spouse_key) {
            Some(member) => Some(member.clone()),
            None => self.members.find_by_key(&spouse_key).await?,
        };
        let Some(spouse) = spouse else {
            return Ok(());
        };

        let mut wanted = Vec::new();
        for parent in [spouse.father(), spouse.mother()].into_iter().flatten() {
            if !acc.contains(parent) && !wanted.contains(parent) {
                wanted.push(*parent);
            }
        }
        acc.add(spouse);
        for member in self.members.find_by_keys(&wanted).await? {
            acc.add(member);
        }
        Ok(())
    }
}
