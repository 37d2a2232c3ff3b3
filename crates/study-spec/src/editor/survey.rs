use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, error, warn};

use super::item::{ItemEditor, NewItemProps};
use crate::error::EditorError;
use crate::expr::{Expression, rebase_reference};
use crate::key_path::{self, child_key, is_within, key_prefixes, local_key};
use crate::spec::{
    LocalizedString, MaxItemsPerPage, Survey, SurveyAvailableFor, SurveyContextDef, SurveyItem,
};

/// Root key of a survey created from scratch.
pub const DEFAULT_SURVEY_KEY: &str = "survey";

/// What [`SurveyEditor::change_item_key`] does with references to the renamed items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    /// Rewrite expression arguments and `follows` entries that point into the renamed subtree.
    #[default]
    Rewrite,
    /// Rename the items only; references keep the old key.
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    /// Group items keep an empty `items` list here; the children live in `children`.
    item: SurveyItem,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Editor for the item tree of one survey.
///
/// Items are stored in an arena and indexed by their full key, so lookups and rekeying never
/// re-split keys along the whole tree. Slots of removed items are not reused; they are unreachable
/// from both the root and the index.
#[derive(Debug, Clone)]
pub struct SurveyEditor {
    /// Survey-level fields. `survey_definition` is rebuilt from the arena on snapshot.
    document: Survey,
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
    root: NodeId,
}

impl Default for SurveyEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl SurveyEditor {
    /// Empty survey rooted at [`DEFAULT_SURVEY_KEY`].
    pub fn new() -> Self {
        let (editor, _) = Self::with_document(Survey::new(DEFAULT_SURVEY_KEY));
        editor
    }

    /// Editor over an existing survey document.
    ///
    /// Fails with [`EditorError::DuplicateKey`] when the document uses a key twice, and with
    /// [`EditorError::KeyOutsideParent`] when an item key does not extend its parent's key.
    pub fn from_survey(survey: Survey) -> Result<Self, EditorError> {
        let (mut editor, children) = Self::with_document(survey);
        let root = editor.root;
        for child in children {
            check_nesting(&child, editor.survey_key())?;
            editor.check_free(&subtree_keys(&child), &HashSet::new())?;
            editor.attach(child, root, None);
        }
        Ok(editor)
    }

    fn with_document(mut document: Survey) -> (Self, Vec<SurveyItem>) {
        let children = std::mem::take(&mut document.survey_definition.items);
        let root_item = SurveyItem::Group(std::mem::take(&mut document.survey_definition));
        let root = NodeId(0);
        let index = HashMap::from([(root_item.key().to_string(), root)]);
        let editor = Self {
            document,
            nodes: vec![Node {
                item: root_item,
                parent: None,
                children: Vec::new(),
            }],
            index,
            root,
        };
        (editor, children)
    }

    /// Key of the root group.
    pub fn survey_key(&self) -> &str {
        self.nodes[self.root.0].item.key()
    }

    pub fn set_survey_name(&mut self, name: Vec<LocalizedString>) {
        self.document.props.name = Some(name);
    }

    pub fn set_survey_description(&mut self, description: Vec<LocalizedString>) {
        self.document.props.description = Some(description);
    }

    pub fn set_survey_duration(&mut self, duration: Vec<LocalizedString>) {
        self.document.props.typical_duration = Some(duration);
    }

    pub fn set_metadata(&mut self, metadata: Option<BTreeMap<String, String>>) {
        self.document.metadata = metadata;
    }

    pub fn set_max_items_per_page(&mut self, limits: MaxItemsPerPage) {
        self.document.max_items_per_page = Some(limits);
    }

    pub fn set_available_for(&mut self, available_for: Option<SurveyAvailableFor>) {
        self.document.available_for = available_for;
    }

    pub fn set_require_login_before_submission(&mut self, required: Option<bool>) {
        self.document.require_login_before_submission = required;
    }

    pub fn set_context_rules(&mut self, rules: SurveyContextDef) {
        self.document.context_rules = Some(rules);
    }

    pub fn set_prefill_rules(&mut self, rules: Vec<Expression>) {
        self.document.prefill_rules = Some(rules);
    }

    pub fn set_version_id(&mut self, version_id: impl Into<String>) {
        self.document.version_id = version_id.into();
    }

    /// True when `key` resolves to an item.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Resolves `key` from the root one segment at a time and returns a copy of the item.
    pub fn find_item(&self, key: &str) -> Result<SurveyItem, EditorError> {
        let id = self.locate(key)?;
        Ok(self.materialize(id))
    }

    /// Creates an item from `props` below `parent_key` (the root when `None`).
    ///
    /// The item's key is the parent key joined with `props.item_key`. A key that already exists
    /// is the fatal [`EditorError::DuplicateKey`].
    pub fn add_item(
        &mut self,
        props: NewItemProps,
        parent_key: Option<&str>,
        at: Option<usize>,
    ) -> Result<SurveyItem, EditorError> {
        let parent = self.resolve_parent(parent_key)?;
        let item_key = child_key(self.nodes[parent.0].item.key(), &props.item_key);
        let item = ItemEditor::new(
            None,
            NewItemProps {
                item_key,
                ..props
            },
        )
        .into_item();
        self.insert(item, parent, at)
    }

    /// Attaches a pre-built item, with its subtree, below `parent_key`.
    pub fn add_existing_item(
        &mut self,
        item: SurveyItem,
        parent_key: &str,
        at: Option<usize>,
    ) -> Result<SurveyItem, EditorError> {
        let parent = self.resolve_parent(Some(parent_key))?;
        self.insert(item, parent, at)
    }

    /// Shallow-merges `item` into the existing item with the same key.
    ///
    /// The parent is found by stripping the last key segment. When `item` is a group its `items`
    /// replace the current children.
    pub fn update_item(&mut self, item: SurveyItem) -> Result<(), EditorError> {
        let key = item.key().to_string();
        let target = if key == self.survey_key() {
            if !item.is_group() {
                return Err(EditorError::NotAGroup { key });
            }
            self.root
        } else {
            self.find_child_by_parent_key(&key)?
        };

        let replaced: HashSet<NodeId> = self.descendants(target).into_iter().collect();
        let old = self.nodes[target.0].item.clone();
        let mut merged = old.merged_with(item);
        let children = merged.take_children();
        for child in &children {
            check_nesting(child, &key)?;
        }
        let keys: Vec<String> = children.iter().flat_map(subtree_keys).collect();
        self.check_free(&keys, &replaced)?;

        for id in &replaced {
            self.unindex(*id);
        }
        let node = &mut self.nodes[target.0];
        node.children.clear();
        node.item = merged;
        for child in children {
            self.attach(child, target, None);
        }
        Ok(())
    }

    /// Renames `old_key` to `new_key` and rekeys every descendant, keeping local segments.
    ///
    /// Only the local segment of a non-root item can change; use
    /// [`SurveyEditor::move_survey_item`] to give it another parent.
    ///
    /// Renaming the root renames the survey. With [`ReferencePolicy::Rewrite`] every expression
    /// argument and `follows` entry equal to `old_key`, or below it, is moved to `new_key`.
    pub fn change_item_key(
        &mut self,
        old_key: &str,
        new_key: &str,
        references: ReferencePolicy,
    ) -> Result<(), EditorError> {
        let target = self.locate(old_key)?;
        if old_key == new_key {
            return Ok(());
        }
        if let Some(parent) = self.nodes[target.0].parent {
            let parent_key = self.nodes[parent.0].item.key();
            if key_path::parent_key(new_key) != Some(parent_key) {
                warn!(from = old_key, to = new_key, "rekey would leave the parent group");
                return Err(EditorError::KeyOutsideParent {
                    key: new_key.to_string(),
                    parent: parent_key.to_string(),
                });
            }
        }
        self.rekey_subtree(target, new_key)?;
        if references == ReferencePolicy::Rewrite {
            let rewritten = self.rewrite_references(old_key, new_key);
            debug!(from = old_key, to = new_key, rewritten, "rewrote key references");
        }
        Ok(())
    }

    /// Removes an item and all its descendants, returning the removed subtree.
    pub fn remove_item(&mut self, key: &str) -> Result<SurveyItem, EditorError> {
        let target = self.locate(key)?;
        if target == self.root {
            warn!(key, "refusing to remove the survey root");
            return Err(EditorError::RootRemoval {
                key: key.to_string(),
            });
        }
        let removed = self.materialize(target);
        self.detach(target);
        for id in self.subtree(target) {
            self.unindex(id);
        }
        debug!(key, "removed survey item");
        Ok(removed)
    }

    /// Moves an item, with its subtree, to the end of the `destination` group.
    ///
    /// The local segment is kept and every key of the subtree is moved below `destination`;
    /// references to the old keys are rewritten.
    pub fn move_survey_item(
        &mut self,
        key: &str,
        destination: &str,
    ) -> Result<SurveyItem, EditorError> {
        let target = self.locate(key)?;
        let dest = self.locate(destination)?;
        if self.subtree(target).contains(&dest) {
            warn!(key, destination, "cannot move an item into its own subtree");
            return Err(EditorError::MoveIntoSelf {
                key: key.to_string(),
                destination: destination.to_string(),
            });
        }
        if !self.nodes[dest.0].item.is_group() {
            return Err(EditorError::NotAGroup {
                key: destination.to_string(),
            });
        }

        let new_key = child_key(self.nodes[dest.0].item.key(), local_key(key));
        let plan = self.rekey_plan(target, &new_key);
        let moving: HashSet<NodeId> = plan.iter().map(|(id, _)| *id).collect();
        let new_keys: Vec<String> = plan.iter().map(|(_, key)| key.clone()).collect();
        self.check_free(&new_keys, &moving)?;

        self.detach(target);
        self.nodes[target.0].parent = Some(dest);
        self.nodes[dest.0].children.push(target);
        self.apply_renames(plan);
        let rewritten = self.rewrite_references(key, &new_key);
        debug!(from = key, to = %new_key, rewritten, "moved survey item");
        Ok(self.materialize(target))
    }

    /// Independent structural copy of the survey as it is now.
    pub fn get_survey(&self) -> Survey {
        let mut survey = self.document.clone();
        if let SurveyItem::Group(root) = self.materialize(self.root) {
            survey.survey_definition = root;
        }
        survey
    }

    pub fn get_survey_json(&self, pretty: bool) -> serde_json::Result<String> {
        let survey = self.get_survey();
        if pretty {
            serde_json::to_string_pretty(&survey)
        } else {
            serde_json::to_string(&survey)
        }
    }

    fn locate(&self, key: &str) -> Result<NodeId, EditorError> {
        let root_key = self.survey_key();
        if key == root_key {
            return Ok(self.root);
        }
        if !is_within(key, root_key) {
            warn!(key, "survey item cannot be found");
            return Err(EditorError::ItemNotFound {
                key: key.to_string(),
            });
        }

        let mut current = self.root;
        for prefix in key_prefixes(key)
            .into_iter()
            .filter(|prefix| prefix.len() > root_key.len())
        {
            let node = &self.nodes[current.0];
            if !node.item.is_group() {
                warn!(key = node.item.key(), "survey item is not a group");
                return Err(EditorError::NotAGroup {
                    key: node.item.key().to_string(),
                });
            }
            match self.index.get(&prefix) {
                Some(&child) if self.nodes[child.0].parent == Some(current) => current = child,
                _ => {
                    warn!(key = %prefix, "survey item cannot be found");
                    return Err(EditorError::ItemNotFound {
                        key: key.to_string(),
                    });
                }
            }
        }
        Ok(current)
    }

    fn resolve_parent(&self, parent_key: Option<&str>) -> Result<NodeId, EditorError> {
        let Some(parent_key) = parent_key else {
            return Ok(self.root);
        };
        let parent = self.locate(parent_key).map_err(|_| {
            warn!(key = parent_key, "parent survey item cannot be found");
            EditorError::ParentNotFound {
                key: parent_key.to_string(),
            }
        })?;
        if !self.nodes[parent.0].item.is_group() {
            return Err(EditorError::NotAGroup {
                key: parent_key.to_string(),
            });
        }
        Ok(parent)
    }

    fn find_child_by_parent_key(&self, key: &str) -> Result<NodeId, EditorError> {
        let parent_key = key_path::parent_key(key).unwrap_or_default();
        let parent = self.locate(parent_key).map_err(|_| {
            warn!(key = parent_key, "parent survey item cannot be found");
            EditorError::ParentNotFound {
                key: parent_key.to_string(),
            }
        })?;
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].item.key() == key)
            .ok_or_else(|| {
                warn!(key, "survey item cannot be found");
                EditorError::ItemNotFound {
                    key: key.to_string(),
                }
            })
    }

    fn insert(
        &mut self,
        item: SurveyItem,
        parent: NodeId,
        at: Option<usize>,
    ) -> Result<SurveyItem, EditorError> {
        check_nesting(&item, self.nodes[parent.0].item.key())?;
        self.check_free(&subtree_keys(&item), &HashSet::new())?;
        let id = self.attach(item, parent, at);
        Ok(self.materialize(id))
    }

    /// Fails when one of `keys` is taken by a node outside `replacing`, or repeats itself.
    fn check_free(&self, keys: &[String], replacing: &HashSet<NodeId>) -> Result<(), EditorError> {
        let mut seen = HashSet::new();
        for key in keys {
            let taken = self
                .index
                .get(key)
                .is_some_and(|id| !replacing.contains(id));
            if taken || !seen.insert(key.as_str()) {
                error!(key = %key, "duplicate key in survey");
                return Err(EditorError::DuplicateKey { key: key.clone() });
            }
        }
        Ok(())
    }

    /// Adds `item` and its subtree below `parent`. Keys must have been checked.
    fn attach(&mut self, mut item: SurveyItem, parent: NodeId, at: Option<usize>) -> NodeId {
        let children = item.take_children();
        let id = NodeId(self.nodes.len());
        self.index.insert(item.key().to_string(), id);
        self.nodes.push(Node {
            item,
            parent: Some(parent),
            children: Vec::new(),
        });
        let siblings = &mut self.nodes[parent.0].children;
        let position = at.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(position, id);
        for child in children {
            self.attach(child, id, None);
        }
        id
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != id);
        }
    }

    fn unindex(&mut self, id: NodeId) {
        let key = self.nodes[id.0].item.key();
        if self.index.get(key) == Some(&id) {
            self.index.remove(key);
        }
    }

    /// `id` followed by its descendants, parents before children.
    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut ordered = vec![id];
        let mut next = 0;
        while next < ordered.len() {
            let current = ordered[next];
            ordered.extend(self.nodes[current.0].children.iter().copied());
            next += 1;
        }
        ordered
    }

    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.subtree(id).into_iter().skip(1).collect()
    }

    /// New key for every node of the subtree when its top gets `new_key`.
    fn rekey_plan(&self, target: NodeId, new_key: &str) -> Vec<(NodeId, String)> {
        let mut renamed: HashMap<NodeId, String> = HashMap::new();
        let mut plan = Vec::new();
        for id in self.subtree(target) {
            let node = &self.nodes[id.0];
            let key = match node.parent.and_then(|parent| renamed.get(&parent)) {
                Some(parent_key) if id != target => {
                    child_key(parent_key, local_key(node.item.key()))
                }
                _ => new_key.to_string(),
            };
            renamed.insert(id, key.clone());
            plan.push((id, key));
        }
        plan
    }

    fn apply_renames(&mut self, plan: Vec<(NodeId, String)>) {
        for (id, _) in &plan {
            self.unindex(*id);
        }
        for (id, key) in plan {
            self.index.insert(key.clone(), id);
            self.nodes[id.0].item.set_key(key);
        }
    }

    fn rekey_subtree(&mut self, target: NodeId, new_key: &str) -> Result<(), EditorError> {
        let plan = self.rekey_plan(target, new_key);
        let moving: HashSet<NodeId> = plan.iter().map(|(id, _)| *id).collect();
        let keys: Vec<String> = plan.iter().map(|(_, key)| key.clone()).collect();
        self.check_free(&keys, &moving)?;
        debug!(to = new_key, items = plan.len(), "rekeying survey subtree");
        self.apply_renames(plan);
        Ok(())
    }

    fn rewrite_references(&mut self, old_key: &str, new_key: &str) -> usize {
        let rewrite = |key: &str| rebase_reference(key, old_key, new_key);
        let mut count = 0;
        let live: Vec<NodeId> = self.index.values().copied().collect();
        for id in live {
            let item = &mut self.nodes[id.0].item;
            item.for_each_own_expression_mut(&mut |expression| {
                count += expression.rewrite_str_args(&rewrite);
            });
            for entry in item.follows_mut().into_iter().flatten() {
                if let Some(replacement) = rewrite(entry.as_str()) {
                    *entry = replacement;
                    count += 1;
                }
            }
        }
        self.document.for_each_rule_expression_mut(&mut |expression| {
            count += expression.rewrite_str_args(&rewrite);
        });
        count
    }

    fn materialize(&self, id: NodeId) -> SurveyItem {
        let node = &self.nodes[id.0];
        let mut item = node.item.clone();
        if let Some(group) = item.as_group_mut() {
            group.items = node
                .children
                .iter()
                .map(|child| self.materialize(*child))
                .collect();
        }
        item
    }
}

/// Fails unless `item` and each of its descendants is keyed one segment below its parent.
fn check_nesting(item: &SurveyItem, parent: &str) -> Result<(), EditorError> {
    if key_path::parent_key(item.key()).unwrap_or_default() != parent {
        warn!(key = item.key(), parent, "item key does not extend its parent key");
        return Err(EditorError::KeyOutsideParent {
            key: item.key().to_string(),
            parent: parent.to_string(),
        });
    }
    for child in item.children() {
        check_nesting(child, item.key())?;
    }
    Ok(())
}

fn subtree_keys(item: &SurveyItem) -> Vec<String> {
    let mut keys = Vec::new();
    item.walk(&mut |item| keys.push(item.key().to_string()));
    keys
}
