#[cfg(test)]
mod tests {
    use crate::analysis::{Analysis, analyze};
    use crate::scope::GlobalScope;
    use crate::token::ErrorCategory;

    #[test]
    fn test_scope_at_picks_innermost() {
        let mut global = GlobalScope::new();
        let src = "local a = 1\nfunction f()\n  if a then\n    local b = 2\n  end\nend\n";
        let analysis = analyze(src, &mut global, None);
        assert!(analysis.errors().is_empty());

        let label = |line| {
            analysis
                .scope_at(line)
                .and_then(|id| analysis.scope(id))
                .map(|s| s.label().to_string())
        };
        assert_eq!(label(0), Some("outer".to_string()));
        assert_eq!(label(1), Some("f".to_string()));
        assert_eq!(label(3), Some("if".to_string()));
        assert_eq!(label(5), Some("f".to_string()));
        assert_eq!(label(6), Some("outer".to_string()));
        assert_eq!(label(100), None);
    }

    #[test]
    fn test_scope_at_tie_prefers_first_closed() {
        let mut global = GlobalScope::new();
        let analysis = analyze("do local a = 1 end do local b = 2 end\n", &mut global, None);
        let id = analysis.scope_at(0);
        let scope = id.and_then(|id| analysis.scope(id));
        assert!(scope.is_some_and(|s| s.get("a").is_some()));
    }

    #[test]
    fn test_empty_analysis() {
        let analysis = Analysis::empty();
        assert_eq!(analysis.scope_at(0), None);
        assert!(analysis.errors().is_empty());
        let global = GlobalScope::new();
        assert!(analysis.env_at(0, &global).lookup_local("x").is_none());
    }

    #[test]
    fn test_lexical_errors_come_first() {
        let mut global = GlobalScope::new();
        let analysis = analyze("end\nx = 'open", &mut global, None);
        let categories: Vec<ErrorCategory> = analysis.errors().iter().map(|e| e.category()).collect();
        assert_eq!(categories, vec![ErrorCategory::Lexical, ErrorCategory::Syntax]);
    }

    #[test]
    fn test_truncated_stream_reports_only_the_lexical_error() {
        let mut global = GlobalScope::new();
        for src in ["x = 'open", "local a = 1\nlocal b = @\n", "local t = { a = 1, $ }\n"] {
            let analysis = analyze(src, &mut global, None);
            let categories: Vec<ErrorCategory> = analysis.errors().iter().map(|e| e.category()).collect();
            assert_eq!(categories, vec![ErrorCategory::Lexical], "source: {src:?}");
        }
    }

    #[test]
    fn test_globals_accumulate_across_files() {
        let mut global = GlobalScope::new();
        analyze("shared = { a = 1 }\n", &mut global, Some("file:///a.lua"));
        let second = analyze("local copy = shared.a\n", &mut global, Some("file:///b.lua"));
        let copy = second.env_at(0, &global).lookup_local("copy");
        assert_eq!(copy.map(|v| v.pretty()), Some("1: number".to_string()));
        assert_eq!(
            copy.and_then(|v| v.origin.location()),
            Some(("file:///a.lua", 0, 15))
        );
    }

    #[test]
    fn test_pretty_lists_scopes() {
        let mut global = GlobalScope::new();
        let analysis = analyze("local a = 1\nfunction f(x)\nend\n", &mut global, None);
        let pretty = analysis.pretty();
        assert!(pretty.starts_with("outer [0, 4) {\n a=1: number\n}\n"));
        assert!(pretty.contains(" f [1, 3) {\n  x=<uninitialized>\n }\n"));
    }
}
