mod formatting_tests {
    use crate::renderer::{PrefixStack, TREE_BRANCH, TREE_LAST, TREE_PIPE, TREE_SPACE};
    use crate::{render_tree, RenderEvent, TableAdapter, TreeOptions, TreeRenderer};

    fn event(depth: usize, is_last: bool, text: &str) -> RenderEvent {
        RenderEvent {
            depth,
            is_last,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_package_with_submodule_and_constant() {
        let mut table = TableAdapter::new();
        let pkg = table.module(None, "pkg");
        let sub = table.module(Some(pkg), "sub");
        table.function(sub, "f");
        table.constant(pkg, "X", "42");

        let tree = render_tree(&table, pkg, "pkg", &TreeOptions::default());
        assert_eq!(tree, "pkg\n├── sub\n│   └── f\n└── X = 42\n");
    }

    #[test]
    fn test_glyphs_are_four_columns_wide() {
        for glyph in [TREE_BRANCH, TREE_LAST, TREE_PIPE, TREE_SPACE] {
            assert_eq!(glyph.chars().count(), 4);
        }
    }

    #[test]
    fn test_continuation_follows_ancestor_position() {
        let events = vec![
            event(1, false, "a"),
            event(2, true, "a1"),
            event(1, true, "b"),
            event(2, false, "b1"),
            event(3, true, "b1x"),
            event(2, true, "b2"),
        ];
        let lines = TreeRenderer.format(&events);
        assert_eq!(
            lines,
            vec![
                "├── a",
                "│   └── a1",
                "└── b",
                "    ├── b1",
                "    │   └── b1x",
                "    └── b2",
            ]
        );
    }

    #[test]
    fn test_exactly_one_corner_per_sibling_group() {
        let events: Vec<RenderEvent> = (0..5)
            .map(|i| event(1, i == 4, &format!("item{}", i)))
            .collect();
        let lines = TreeRenderer.format(&events);
        let corners = lines.iter().filter(|l| l.starts_with(TREE_LAST)).count();
        let tees = lines.iter().filter(|l| l.starts_with(TREE_BRANCH)).count();
        assert_eq!(corners, 1);
        assert_eq!(tees, 4);
        assert!(lines[4].starts_with(TREE_LAST));
    }

    #[test]
    fn test_prefix_stack_pads_skipped_levels() {
        let mut stack = PrefixStack::new();
        assert_eq!(stack.line(3, true), "        └── ");
        assert_eq!(stack.line(1, false), "├── ");
        assert_eq!(stack.line(2, true), "│   └── ");
    }

    #[test]
    fn test_empty_events_render_root_only() {
        assert_eq!(TreeRenderer.render("root", &[]), "root\n");
    }
}

mod ordering_tests {
    use std::cmp::Ordering;

    use crate::reflect::{Child, EntityId, EntityKind, Member};
    use crate::walker::policy::*;
    use crate::{render_tree, TableAdapter, TreeOptions};

    #[test]
    fn test_private_names_sort_after_public_ones() {
        assert_eq!(compare_names("Foo", "_Bar"), Ordering::Less);
        assert_eq!(compare_names("_a", "z"), Ordering::Greater);
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_names("Alpha", "alpha"), Ordering::Less);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_private_filter_scenario() {
        let mut table = TableAdapter::new();
        let root = table.module(None, "m");
        table.class(root, "_Bar");
        table.class(root, "Foo");

        let options = TreeOptions::default();
        let public = render_tree(&table, root, "m", &options);
        assert_eq!(public, "m\n└── Foo\n");

        let all = render_tree(&table, root, "m", &options.with_private(true));
        assert_eq!(all, "m\n├── Foo\n└── _Bar\n");
    }

    #[test]
    fn test_hidden_entities_follow_the_private_filter() {
        let mut table = TableAdapter::new();
        let root = table.module(None, "m");
        let internal = table.class(root, "Internal");
        let widget = table.class(root, "Widget");
        table.method(widget, "draw");
        let reset = table.method(widget, "reset");
        table.hide(internal);
        table.hide(reset);

        let options = TreeOptions::default();
        let public = render_tree(&table, root, "m", &options);
        assert_eq!(public, "m\n└── Widget\n    └── draw\n");

        // Hidden names keep their place in the collation; only `_` moves them.
        let all = render_tree(&table, root, "m", &options.with_private(true));
        assert_eq!(all, "m\n├── Internal\n└── Widget\n    ├── draw\n    └── reset\n");
    }

    #[test]
    fn test_buckets_in_fixed_order_and_sorted_within() {
        let mut table = TableAdapter::new();
        let root = table.module(None, "m");
        table.constant(root, "beta", "2");
        table.function(root, "run");
        table.constant(root, "ALPHA", "1");
        table.class(root, "zeta");
        table.module(Some(root), "Zoo");
        table.class(root, "Alpha");
        table.module(Some(root), "abc");
        table.function(root, "Build");

        let tree = render_tree(&table, root, "m", &TreeOptions::default().with_depth(1));
        assert_eq!(
            tree,
            "m\n├── abc\n├── Zoo\n├── Alpha\n├── zeta\n├── Build\n├── run\n├── ALPHA = 1\n└── beta = 2\n"
        );
    }

    #[test]
    fn test_reexported_types_stay_in_their_own_module() {
        let mut table = TableAdapter::new();
        let root = table.module(None, "m");
        let inner = table.module(Some(root), "inner");
        let thing = table.class(inner, "Thing");
        let helper = table.function(inner, "helper");
        let limit = table.constant(inner, "LIMIT", "10");
        table.reexport(root, "Thing", thing);
        table.reexport(root, "helper", helper);
        table.reexport(root, "LIMIT", limit);

        let tree = render_tree(&table, root, "m", &TreeOptions::default());
        assert_eq!(
            tree,
            "m\n├── inner\n│   ├── Thing\n│   ├── helper\n│   └── LIMIT = 10\n└── LIMIT = 10\n"
        );
    }

    #[test]
    fn test_order_children_drops_unowned_and_hidden() {
        let parent = EntityId(1);
        let other = EntityId(2);
        let children = vec![
            Child::new("Local", EntityKind::Class, Some(EntityId(10))).owned_by(parent),
            Child::new("Foreign", EntityKind::Class, Some(EntityId(11))).owned_by(other),
            Child::new("orphan", EntityKind::Function, Some(EntityId(12))),
            Child::new("secret", EntityKind::Function, Some(EntityId(13)))
                .owned_by(parent)
                .hidden(true),
            Child::new("sub", EntityKind::Submodule, Some(EntityId(14))).owned_by(other),
        ];

        let kept: Vec<String> = order_children(parent, children.clone(), false)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(kept, vec!["sub", "Local"]);

        let with_private: Vec<String> = order_children(parent, children, true)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(with_private, vec!["sub", "Local", "secret"]);
    }

    #[test]
    fn test_members_sorted_case_insensitively() {
        let members = vec![
            Member::new("zap", EntityId(1)),
            Member::new("_hidden", EntityId(2)),
            Member::new("Apply", EntityId(3)),
            Member::new("build", EntityId(4)),
        ];
        let names: Vec<String> = order_members(members, false)
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Apply", "build", "zap"]);
    }
}

mod walker_tests {
    use crate::reflect::{preview_value, ELLIPSIS, PREVIEW_LIMIT};
    use crate::renderer::TREE_LAST;
    use crate::{render_tree, TableAdapter, TreeOptions, Walker, ALREADY_VISITED};

    #[test]
    fn test_depth_zero_prints_root_only() {
        let mut table = TableAdapter::new();
        let root = table.module(None, "pkg");
        table.function(root, "f");
        table.module(Some(root), "sub");

        let tree = render_tree(&table, root, "pkg", &TreeOptions::default().with_depth(0));
        assert_eq!(tree, "pkg\n");
    }

    #[test]
    fn test_no_event_deeper_than_max_depth() {
        let mut table = TableAdapter::new();
        let root = table.module(None, "a");
        let mut parent = root;
        for level in 0..6 {
            let child = table.module(Some(parent), &format!("level{}", level));
            let class = table.class(child, "Thing");
            table.method(class, "run");
            table.constant(child, "N", "1");
            parent = child;
        }

        for max_depth in 0..8 {
            let options = TreeOptions::default().with_depth(max_depth);
            let events = Walker::new(&table, &options).walk(root);
            assert!(events.iter().all(|e| e.depth <= max_depth));
            if max_depth > 0 {
                assert!(events.iter().any(|e| e.depth == max_depth));
            }
        }
    }

    #[test]
    fn test_cycle_is_expanded_once() {
        let mut table = TableAdapter::new();
        let a = table.module(None, "a");
        let b = table.module(Some(a), "b");
        table.link_submodule(b, "a", a);
        table.function(b, "f");

        let tree = render_tree(&table, a, "a", &TreeOptions::default().with_depth(5));
        assert_eq!(
            tree,
            "a\n└── b\n    ├── a\n    │   └── (already visited)\n    └── f\n"
        );
        assert_eq!(tree.matches(ALREADY_VISITED).count(), 1);
    }

    #[test]
    fn test_diamond_module_expanded_once() {
        let mut table = TableAdapter::new();
        let root = table.module(None, "root");
        let left = table.module(Some(root), "left");
        let right = table.module(Some(root), "right");
        let shared = table.module(Some(left), "shared");
        table.function(shared, "work");
        table.link_submodule(right, "shared", shared);

        let tree = render_tree(&table, root, "root", &TreeOptions::default().with_depth(3));
        assert_eq!(
            tree,
            "root\n├── left\n│   └── shared\n│       └── work\n└── right\n    └── shared\n        └── (already visited)\n"
        );
        assert_eq!(tree.matches("work").count(), 1);
    }

    #[test]
    fn test_class_members_one_level_deeper() {
        let mut table = TableAdapter::new();
        let root = table.module(None, "m");
        let class = table.class(root, "Widget");
        table.method(class, "resize");
        table.method(class, "Draw");
        table.method(class, "_cache");
        table.function(root, "make");

        let tree = render_tree(&table, root, "m", &TreeOptions::default());
        assert_eq!(
            tree,
            "m\n├── Widget\n│   ├── Draw\n│   └── resize\n└── make\n"
        );

        let shallow = render_tree(&table, root, "m", &TreeOptions::default().with_depth(1));
        assert_eq!(shallow, "m\n├── Widget\n└── make\n");
    }

    #[test]
    fn test_doc_lines_annotate_classes_functions_and_methods() {
        let mut table = TableAdapter::new();
        let root = table.module(None, "m");
        table.document(root, "Never shown.");
        let sub = table.module(Some(root), "sub");
        table.document(sub, "Not shown either.");
        let class = table.class(root, "Widget");
        table.document(class, "\n  A widget.  \nMore text.");
        let method = table.method(class, "draw");
        table.document(method, "Draws it.");
        table.function(root, "plain");
        let value = table.constant(root, "K", "1");
        table.document(value, "Constants stay bare.");

        let options = TreeOptions::default().with_docs(true);
        let tree = render_tree(&table, root, "m", &options);
        assert_eq!(
            tree,
            "m\n├── sub\n├── Widget — A widget.\n│   └── draw — Draws it.\n├── plain\n└── K = 1\n"
        );

        let without = render_tree(&table, root, "m", &options.with_docs(false));
        assert!(!without.contains('—'));
    }

    #[test]
    fn test_long_constant_preview_is_cut() {
        let long = format!("\"{}\"", "x".repeat(100));
        let preview = preview_value(&long);
        assert_eq!(preview.chars().count(), PREVIEW_LIMIT);
        assert!(preview.ends_with(ELLIPSIS));
        assert!(preview.starts_with("\"xxx"));

        let mut table = TableAdapter::new();
        let root = table.module(None, "m");
        table.constant(root, "LONG", &long);
        let tree = render_tree(&table, root, "m", &TreeOptions::default());
        let line = tree.lines().nth(1).unwrap();
        let shown = line.trim_start_matches(TREE_LAST).trim_start_matches("LONG = ");
        assert_eq!(shown.chars().count(), 60);
    }

    #[test]
    fn test_short_and_multiline_previews() {
        assert_eq!(preview_value("42"), "42");
        let exact = "y".repeat(PREVIEW_LIMIT);
        assert_eq!(preview_value(&exact), exact);
        assert_eq!(preview_value("[\n    1,\n    2,\n]"), "[ 1, 2, ]");
        assert_eq!(preview_value(&"é".repeat(70)).chars().count(), PREVIEW_LIMIT);
    }

    #[test]
    fn test_failed_enumeration_keeps_walking() {
        let mut table = TableAdapter::new();
        let root = table.module(None, "root");
        let broken = table.module(Some(root), "broken");
        table.module(Some(broken), "optional");
        table.function(broken, "still_listed");
        let fine = table.module(Some(root), "fine");
        table.function(fine, "ok");
        table.fail_enumeration(broken);

        let tree = render_tree(&table, root, "root", &TreeOptions::default());
        assert_eq!(
            tree,
            "root\n├── broken\n│   └── still_listed\n└── fine\n    └── ok\n"
        );
    }

    #[test]
    fn test_repeated_walks_are_identical() {
        let mut table = TableAdapter::new();
        let a = table.module(None, "a");
        let b = table.module(Some(a), "b");
        table.link_submodule(b, "back", a);
        table.class(b, "Node");
        table.constant(a, "Z", "'z'");

        let options = TreeOptions::default().with_depth(4).with_private(true);
        let first = render_tree(&table, a, "a", &options);
        let second = render_tree(&table, a, "a", &options);
        assert_eq!(first, second);
        // Each walk starts from an empty visited set.
        assert_eq!(first.matches(ALREADY_VISITED).count(), 1);
    }
}

mod adapter_tests {
    use crate::reflect::{first_line, split_path};
    use crate::{EntityKind, Reflect, TableAdapter};

    #[test]
    fn test_split_path_accepts_both_separators() {
        let segments: Vec<&str> = split_path("a::b.c").collect();
        assert_eq!(segments, vec!["a", "b", "c"]);
        assert_eq!(split_path("").count(), 0);
        assert_eq!(split_path("::").count(), 0);
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("\n\n  Hello  \nworld").as_deref(), Some("Hello"));
        assert_eq!(first_line("   \n  "), None);
    }

    #[test]
    fn test_table_resolution() {
        let mut table = TableAdapter::new();
        let pkg = table.module(None, "pkg");
        let sub = table.module(Some(pkg), "sub");
        let deep = table.module(Some(sub), "deep");
        table.class(sub, "NotAModule");

        assert_eq!(table.resolve("pkg").unwrap(), pkg);
        assert_eq!(table.resolve("pkg.sub.deep").unwrap(), deep);
        assert_eq!(table.resolve("pkg::sub").unwrap(), sub);
        assert!(table.resolve("pkg.sub.NotAModule").is_err());
        assert!(table.resolve("other").is_err());
        assert!(table.resolve("").is_err());
    }

    #[test]
    fn test_children_concatenates_submodules_and_members() {
        let mut table = TableAdapter::new();
        let pkg = table.module(None, "pkg");
        table.function(pkg, "f");
        table.module(Some(pkg), "sub");
        let class = table.class(pkg, "C");
        table.method(class, "m");

        let kinds: Vec<EntityKind> = table.children(pkg).iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![EntityKind::Submodule, EntityKind::Function, EntityKind::Class]
        );
        assert!(table.children(class).is_empty());
        assert_eq!(table.own_members(class).len(), 1);
    }
}

mod mock_tests {
    use mockall::mock;
    use mockall::predicate::eq;

    use crate::reflect::{Child, EntityId, EntityKind, Member, Reflect};
    use crate::{render_tree, TreeOptions};

    mock! {
        pub Graph {}

        impl Reflect for Graph {
            fn classify(&self, entity: EntityId) -> EntityKind;
            fn submodules(&self, module: EntityId) -> Vec<Child>;
            fn members(&self, module: EntityId) -> Vec<Child>;
            fn own_members(&self, class: EntityId) -> Vec<Member>;
            fn first_doc_line(&self, entity: EntityId) -> Option<String>;
        }
    }

    const ROOT: EntityId = EntityId(1);
    const SUB: EntityId = EntityId(2);

    fn graph() -> MockGraph {
        let mut graph = MockGraph::new();
        graph
            .expect_classify()
            .returning(|_| EntityKind::Submodule);
        graph
            .expect_submodules()
            .with(eq(ROOT))
            .times(1)
            .returning(|_| vec![Child::new("sub", EntityKind::Submodule, Some(SUB))]);
        graph
            .expect_members()
            .with(eq(ROOT))
            .returning(|_| Vec::new());
        graph
    }

    #[test]
    fn test_fringe_submodules_are_not_enumerated() {
        // No expectation for `submodules(SUB)`: calling it would panic.
        let graph = graph();
        let tree = render_tree(&graph, ROOT, "root", &TreeOptions::default().with_depth(1));
        assert_eq!(tree, "root\n└── sub\n");
    }

    #[test]
    fn test_docs_are_not_looked_up_unless_requested() {
        let mut graph = graph();
        graph
            .expect_submodules()
            .with(eq(SUB))
            .times(1)
            .returning(|_| Vec::new());
        graph.expect_members().with(eq(SUB)).returning(|_| {
            vec![Child::new("f", EntityKind::Function, Some(EntityId(3))).owned_by(SUB)]
        });

        let tree = render_tree(&graph, ROOT, "root", &TreeOptions::default());
        assert_eq!(tree, "root\n└── sub\n    └── f\n");
    }
}
