//! Static category trees and the selection walker shared by every consumer.
//!
//! Records and selections refer to categories through [`CategoryPath`], a
//! structured `(parent, child, grandchild)` identifier. The `"Parent - Child"`
//! display form is produced only when a path is rendered or serialized, and
//! parsing a label back walks the catalog instead of splitting strings.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Deepest supported taxonomy level.
pub const MAX_DEPTH: usize = 3;

/// Separator used when a path is rendered for display.
pub const PATH_SEPARATOR: &str = " - ";

/// Node of a static category tree. A node without children is a leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub name: &'static str,
    #[serde(skip_serializing_if = "has_no_children")]
    pub children: &'static [CategoryNode],
}

fn has_no_children(children: &&'static [CategoryNode]) -> bool {
    children.is_empty()
}

impl CategoryNode {
    pub const fn leaf(name: &'static str) -> Self {
        Self {
            name,
            children: &[],
        }
    }

    pub const fn branch(name: &'static str, children: &'static [CategoryNode]) -> Self {
        Self { name, children }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Position of a node inside a category tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryPath {
    segments: [&'static str; MAX_DEPTH],
    depth: u8,
}

impl CategoryPath {
    /// Path to a top-level node.
    pub const fn root(name: &'static str) -> Self {
        Self {
            segments: [name, "", ""],
            depth: 1,
        }
    }

    /// Path one level below `self`, or `None` past [`MAX_DEPTH`].
    pub fn child(self, name: &'static str) -> Option<Self> {
        let depth = self.depth();
        if depth >= MAX_DEPTH {
            return None;
        }
        let mut segments = self.segments;
        segments[depth] = name;
        Some(Self {
            segments,
            depth: self.depth + 1,
        })
    }

    pub fn segments(&self) -> &[&'static str] {
        &self.segments[..self.depth()]
    }

    pub fn depth(&self) -> usize {
        usize::from(self.depth)
    }

    /// Name of the top-level ancestor (the path itself at depth 1).
    pub fn root_name(&self) -> &'static str {
        self.segments[0]
    }

    /// Name of the deepest segment.
    pub fn leaf_name(&self) -> &'static str {
        self.segments[self.depth() - 1]
    }

    pub fn parent(&self) -> Option<Self> {
        (self.depth > 1).then(|| self.truncated(self.depth() - 1))
    }

    /// Ancestor at `depth` (clamped to `1..=self.depth()`).
    pub fn truncated(&self, depth: usize) -> Self {
        let depth = depth.clamp(1, self.depth());
        let mut segments = ["", "", ""];
        segments[..depth].copy_from_slice(&self.segments[..depth]);
        Self {
            segments,
            depth: depth as u8,
        }
    }

    /// True when `self` equals `ancestor` or lies below it.
    pub fn is_within(&self, ancestor: &CategoryPath) -> bool {
        ancestor.depth <= self.depth && self.segments[..ancestor.depth()] == *ancestor.segments()
    }

    /// Resolve a display label against a catalog. Matching is on whole
    /// rendered paths (ASCII case-insensitive), so names containing the
    /// separator stay unambiguous.
    pub fn parse(label: &str, nodes: &'static [CategoryNode]) -> Option<Self> {
        let wanted = label.trim();
        all_paths(nodes)
            .into_iter()
            .find(|path| path.to_string().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments().iter().enumerate() {
            if i > 0 {
                f.write_str(PATH_SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl Serialize for CategoryPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

const SKIN_CARE: &[CategoryNode] = &[
    CategoryNode::leaf("Cleansers"),
    CategoryNode::leaf("Moisturizers"),
    CategoryNode::leaf("Serums"),
    CategoryNode::leaf("Sunscreen"),
    CategoryNode::leaf("Face Masks"),
    CategoryNode::leaf("Toners"),
];

const HAIR_CARE: &[CategoryNode] = &[
    CategoryNode::leaf("Shampoo"),
    CategoryNode::leaf("Conditioner"),
    CategoryNode::leaf("Hair Oil"),
    CategoryNode::leaf("Styling"),
];

const MAKEUP: &[CategoryNode] = &[
    CategoryNode::leaf("Foundation"),
    CategoryNode::leaf("Lipstick"),
    CategoryNode::leaf("Mascara"),
    CategoryNode::leaf("Eyeshadow"),
];

const BATH_AND_BODY: &[CategoryNode] = &[
    CategoryNode::leaf("Body Wash"),
    CategoryNode::leaf("Body Lotion"),
];

static PRODUCT_HIERARCHY: &[CategoryNode] = &[
    CategoryNode::branch("Skin Care", SKIN_CARE),
    CategoryNode::branch("Hair Care", HAIR_CARE),
    CategoryNode::branch("Makeup", MAKEUP),
    CategoryNode::leaf("Fragrance"),
    CategoryNode::branch("Bath & Body", BATH_AND_BODY),
];

const SPECIALTY_STORES: &[CategoryNode] = &[
    CategoryNode::leaf("Beauty Stores"),
    CategoryNode::leaf("Pharmacies & Drugstores"),
];

const OFFLINE: &[CategoryNode] = &[
    CategoryNode::leaf("Supermarkets & Hypermarkets"),
    CategoryNode::branch("Specialty Stores", SPECIALTY_STORES),
    CategoryNode::leaf("Department Stores"),
];

const ECOMMERCE_PLATFORMS: &[CategoryNode] = &[
    CategoryNode::leaf("Marketplaces"),
    CategoryNode::leaf("Social Commerce"),
];

const ONLINE: &[CategoryNode] = &[
    CategoryNode::leaf("Brand Websites"),
    CategoryNode::branch("E-commerce Platforms", ECOMMERCE_PLATFORMS),
];

static SALES_CHANNEL_HIERARCHY: &[CategoryNode] = &[
    CategoryNode::branch("Offline", OFFLINE),
    CategoryNode::branch("Online", ONLINE),
];

/// Two-level product taxonomy.
pub fn product_hierarchy() -> &'static [CategoryNode] {
    PRODUCT_HIERARCHY
}

/// Sales-channel taxonomy, up to three levels deep.
pub fn sales_channel_hierarchy() -> &'static [CategoryNode] {
    SALES_CHANNEL_HIERARCHY
}

fn path_for(prefix: Option<CategoryPath>, name: &'static str) -> Option<CategoryPath> {
    match prefix {
        Some(parent) => parent.child(name),
        None => Some(CategoryPath::root(name)),
    }
}

fn collect_leaves(node: &CategoryNode, path: CategoryPath, on_leaf: &mut dyn FnMut(CategoryPath)) {
    if node.is_leaf() {
        on_leaf(path);
        return;
    }
    for child in node.children {
        if let Some(child_path) = path.child(child.name) {
            collect_leaves(child, child_path, on_leaf);
        }
    }
}

fn visit(
    nodes: &[CategoryNode],
    prefix: Option<CategoryPath>,
    is_selected: &dyn Fn(&CategoryPath) -> bool,
    on_leaf: &mut dyn FnMut(CategoryPath),
) {
    for node in nodes {
        let Some(path) = path_for(prefix, node.name) else {
            continue;
        };
        if is_selected(&path) {
            collect_leaves(node, path, on_leaf);
        } else {
            visit(node.children, Some(path), is_selected, on_leaf);
        }
    }
}

/// Walk `nodes`; every node accepted by `is_selected` hands all of its
/// descendant leaves (itself, for a leaf) to `on_leaf`. Unselected nodes are
/// still searched for deeper selections.
pub fn walk_selected<P, F>(nodes: &[CategoryNode], is_selected: P, mut on_leaf: F)
where
    P: Fn(&CategoryPath) -> bool,
    F: FnMut(CategoryPath),
{
    visit(nodes, None, &is_selected, &mut on_leaf);
}

/// Leaf set covered by `selected`. Selected paths unknown to the catalog are
/// kept verbatim.
pub fn expand_selection(
    nodes: &[CategoryNode],
    selected: &[CategoryPath],
) -> BTreeSet<CategoryPath> {
    let mut expanded = BTreeSet::new();
    walk_selected(
        nodes,
        |path| selected.contains(path),
        |leaf| {
            expanded.insert(leaf);
        },
    );
    for path in selected {
        if find_node(nodes, path).is_none() {
            expanded.insert(*path);
        }
    }
    expanded
}

/// Every leaf in declaration order.
pub fn leaf_paths(nodes: &[CategoryNode]) -> Vec<CategoryPath> {
    let mut leaves = Vec::new();
    walk_selected(nodes, |_| true, |leaf| leaves.push(leaf));
    leaves
}

/// Every node (branches and leaves), parents before their children.
pub fn all_paths(nodes: &[CategoryNode]) -> Vec<CategoryPath> {
    fn push_all(nodes: &[CategoryNode], prefix: Option<CategoryPath>, out: &mut Vec<CategoryPath>) {
        for node in nodes {
            if let Some(path) = path_for(prefix, node.name) {
                out.push(path);
                push_all(node.children, Some(path), out);
            }
        }
    }
    let mut out = Vec::new();
    push_all(nodes, None, &mut out);
    out
}

/// Node addressed by `path`, if the catalog contains it.
pub fn find_node<'a>(nodes: &'a [CategoryNode], path: &CategoryPath) -> Option<&'a CategoryNode> {
    let mut level = nodes;
    let mut found = None;
    for segment in path.segments() {
        let node = level.iter().find(|n| n.name == *segment)?;
        level = node.children;
        found = Some(node);
    }
    found
}

/// Paths of the direct children of `path`.
pub fn children_of(nodes: &[CategoryNode], path: &CategoryPath) -> Vec<CategoryPath> {
    find_node(nodes, path)
        .map(|node| {
            node.children
                .iter()
                .filter_map(|child| path.child(child.name))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skin_care() -> CategoryPath {
        CategoryPath::root("Skin Care")
    }

    #[test]
    fn paths_render_with_separator() {
        let serums = skin_care().child("Serums").unwrap();
        assert_eq!(serums.to_string(), "Skin Care - Serums");
        assert_eq!(
            serde_json::to_string(&serums).unwrap(),
            "\"Skin Care - Serums\""
        );
        assert_eq!(serums.parent(), Some(skin_care()));
        assert_eq!(skin_care().parent(), None);
    }

    #[test]
    fn child_stops_at_max_depth() {
        let deep = CategoryPath::root("a")
            .child("b")
            .unwrap()
            .child("c")
            .unwrap();
        assert_eq!(deep.depth(), MAX_DEPTH);
        assert!(deep.child("d").is_none());
    }

    #[test]
    fn expanding_skin_care_yields_its_six_children() {
        let expanded = expand_selection(product_hierarchy(), &[skin_care()]);
        let labels: Vec<String> = expanded.iter().map(ToString::to_string).collect();
        assert_eq!(labels.len(), 6);
        assert!(labels.iter().all(|l| l.starts_with("Skin Care - ")));
        assert!(!expanded.contains(&skin_care()));
    }

    #[test]
    fn expansion_keeps_selected_leaves_and_collapses_duplicates() {
        let serums = skin_care().child("Serums").unwrap();
        let expanded = expand_selection(product_hierarchy(), &[serums, skin_care(), serums]);
        assert_eq!(expanded.len(), 6);

        let fragrance = CategoryPath::root("Fragrance");
        let only_leaf = expand_selection(product_hierarchy(), &[fragrance]);
        assert_eq!(only_leaf.into_iter().collect::<Vec<_>>(), vec![fragrance]);
    }

    #[test]
    fn expansion_recurses_into_unselected_branches() {
        let specialty = CategoryPath::root("Offline")
            .child("Specialty Stores")
            .unwrap();
        let expanded = expand_selection(sales_channel_hierarchy(), &[specialty]);
        let labels: Vec<String> = expanded.iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            vec![
                "Offline - Specialty Stores - Beauty Stores",
                "Offline - Specialty Stores - Pharmacies & Drugstores",
            ]
        );
    }

    #[test]
    fn unknown_selection_is_kept_verbatim() {
        let unknown = CategoryPath::root("Oral Care");
        let expanded = expand_selection(product_hierarchy(), &[unknown]);
        assert!(expanded.contains(&unknown));
    }

    #[test]
    fn leaf_counts() {
        assert_eq!(leaf_paths(product_hierarchy()).len(), 17);
        assert_eq!(leaf_paths(sales_channel_hierarchy()).len(), 7);
        assert_eq!(
            children_of(sales_channel_hierarchy(), &CategoryPath::root("Offline")).len(),
            3
        );
    }

    #[test]
    fn parse_walks_the_catalog() {
        let parsed = CategoryPath::parse(
            "online - e-commerce platforms - marketplaces",
            sales_channel_hierarchy(),
        );
        assert_eq!(
            parsed.map(|p| p.segments().to_vec()),
            Some(vec!["Online", "E-commerce Platforms", "Marketplaces"])
        );
        assert!(CategoryPath::parse("Skin Care - Nail Polish", product_hierarchy()).is_none());
    }

    #[test]
    fn within_is_structural() {
        let marketplaces = CategoryPath::parse(
            "Online - E-commerce Platforms - Marketplaces",
            sales_channel_hierarchy(),
        )
        .unwrap();
        assert!(marketplaces.is_within(&CategoryPath::root("Online")));
        assert!(marketplaces.is_within(&marketplaces));
        assert!(!CategoryPath::root("Online").is_within(&marketplaces));
        assert!(!marketplaces.is_within(&CategoryPath::root("Offline")));
    }

    #[test]
    fn hierarchy_serializes_children_only_for_branches() {
        let json = serde_json::to_value(product_hierarchy()).unwrap();
        assert_eq!(json[0]["name"], "Skin Care");
        assert_eq!(json[0]["children"].as_array().unwrap().len(), 6);
        assert!(json[3].get("children").is_none());
    }
}
