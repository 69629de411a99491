//! Model nodes.
//!
//! Supervised estimators fit on their input variable as the training
//! features and on the canonical `y_train` emitted by an upstream
//! `train_test_split`; connect one upstream of any supervised model.
//! `kmeans_cluster` is unsupervised and works on any DataFrame input.

use std::fmt::Write as _;

use pandaflow_graph_core::{
    py, CompileContext, GenerateError, NodeDefinition, NodeInstance, PropertyKind, PropertySpec,
};
use serde_json::json;

use crate::support::f64_value;

pub fn definitions() -> Vec<NodeDefinition> {
    vec![
        NodeDefinition {
            type_id: "linear_regression",
            name: "Linear Regression",
            category: "Models",
            icon: "trending-up",
            color: "#8E4DA4",
            description: "Ordinary least squares regression.",
            properties: vec![],
            generate: gen_linear_regression,
        },
        NodeDefinition {
            type_id: "logistic_regression",
            name: "Logistic Regression",
            category: "Models",
            icon: "git-branch",
            color: "#8E4DA4",
            description: "Logistic regression classifier.",
            properties: vec![PropertySpec {
                default: Some(json!(200)),
                min: Some(1.0),
                help: "Maximum solver iterations.",
                ..PropertySpec::new("max_iter", "Max iterations", PropertyKind::Number)
            }],
            generate: gen_logistic_regression,
        },
        NodeDefinition {
            type_id: "decision_tree_classifier",
            name: "Decision Tree",
            category: "Models",
            icon: "tree",
            color: "#8E4DA4",
            description: "Decision tree classifier.",
            properties: vec![PropertySpec {
                min: Some(1.0),
                help: "Depth limit; empty grows the full tree.",
                ..PropertySpec::new("max_depth", "Max depth", PropertyKind::Number)
            }],
            generate: gen_decision_tree,
        },
        NodeDefinition {
            type_id: "random_forest_classifier",
            name: "Random Forest",
            category: "Models",
            icon: "trees",
            color: "#8E4DA4",
            description: "Random forest classifier.",
            properties: vec![
                PropertySpec {
                    default: Some(json!(100)),
                    min: Some(1.0),
                    help: "Number of trees.",
                    ..PropertySpec::new("n_estimators", "Estimators", PropertyKind::Number)
                },
                PropertySpec {
                    min: Some(1.0),
                    help: "Depth limit; empty grows full trees.",
                    ..PropertySpec::new("max_depth", "Max depth", PropertyKind::Number)
                },
            ],
            generate: gen_random_forest,
        },
        NodeDefinition {
            type_id: "kmeans_cluster",
            name: "K-Means Cluster",
            category: "Models",
            icon: "circle-dot",
            color: "#8E4DA4",
            description: "Cluster rows and append a `cluster` column.",
            properties: vec![
                PropertySpec {
                    default: Some(json!(5)),
                    min: Some(2.0),
                    help: "Number of clusters.",
                    ..PropertySpec::new("n_clusters", "Clusters", PropertyKind::Number)
                },
                PropertySpec {
                    default: Some(json!(42)),
                    ..PropertySpec::new("random_state", "Random state", PropertyKind::Number)
                },
            ],
            generate: gen_kmeans,
        },
    ]
}

fn fit_model(
    node: &NodeInstance,
    ctx: &mut CompileContext,
    import: &str,
    constructor: String,
) -> Result<String, GenerateError> {
    let input = ctx.input_var(node);
    let out = ctx.unique_var("model");
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = format!("{import}\n");
    let _ = writeln!(code, "{out} = {constructor}");
    let _ = writeln!(code, "{out}.fit({input}, y_train)");
    Ok(code)
}

fn gen_linear_regression(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    fit_model(
        node,
        ctx,
        "from sklearn.linear_model import LinearRegression",
        "LinearRegression()".to_string(),
    )
}

fn gen_logistic_regression(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let max_iter = f64_value(node, "max_iter").unwrap_or(200.0);
    fit_model(
        node,
        ctx,
        "from sklearn.linear_model import LogisticRegression",
        format!("LogisticRegression(max_iter={})", py::int_lit(max_iter)),
    )
}

fn gen_decision_tree(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let constructor = match f64_value(node, "max_depth") {
        Some(depth) => format!("DecisionTreeClassifier(max_depth={})", py::int_lit(depth)),
        None => "DecisionTreeClassifier()".to_string(),
    };
    fit_model(
        node,
        ctx,
        "from sklearn.tree import DecisionTreeClassifier",
        constructor,
    )
}

fn gen_random_forest(
    node: &NodeInstance,
    ctx: &mut CompileContext,
) -> Result<String, GenerateError> {
    let n_estimators = f64_value(node, "n_estimators").unwrap_or(100.0);
    let constructor = match f64_value(node, "max_depth") {
        Some(depth) => format!(
            "RandomForestClassifier(n_estimators={}, max_depth={})",
            py::int_lit(n_estimators),
            py::int_lit(depth)
        ),
        None => format!(
            "RandomForestClassifier(n_estimators={})",
            py::int_lit(n_estimators)
        ),
    };
    fit_model(
        node,
        ctx,
        "from sklearn.ensemble import RandomForestClassifier",
        constructor,
    )
}

fn gen_kmeans(node: &NodeInstance, ctx: &mut CompileContext) -> Result<String, GenerateError> {
    let n_clusters = f64_value(node, "n_clusters").unwrap_or(5.0);
    let random_state = f64_value(node, "random_state").unwrap_or(42.0);
    let input = ctx.input_var(node);
    let out = ctx.unique_var(&format!("{input}_clustered"));
    ctx.bind_output(&node.id, out.clone())?;

    let mut code = String::from("from sklearn.cluster import KMeans\n");
    let _ = writeln!(code, "{out} = {input}.copy()");
    let _ = writeln!(
        code,
        "kmeans = KMeans(n_clusters={}, random_state={}, n_init=10)",
        py::int_lit(n_clusters),
        py::int_lit(random_state)
    );
    let _ = writeln!(
        code,
        "{out}['cluster'] = kmeans.fit_predict({out}.select_dtypes(include='number'))"
    );
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pandaflow_graph_core::{compile, GraphSpec, Registry};
    use serde_json::json;

    fn compile_single(type_id: &str, data: &[(&str, serde_json::Value)]) -> String {
        let mut registry = Registry::new();
        assert!(registry.register_all(definitions()).is_empty());
        let mut node = NodeInstance::new("n1", type_id);
        for (key, value) in data {
            node.data.insert(key.to_string(), value.clone());
        }
        let graph = GraphSpec {
            nodes: vec![node],
            edges: vec![],
        };
        let result = compile(&registry, &graph).unwrap();
        assert!(result.is_clean(), "errors: {:?}", result.errors);
        result.script
    }

    #[test]
    fn logistic_regression_uses_default_max_iter() {
        let script = compile_single("logistic_regression", &[]);
        assert!(script.contains("model = LogisticRegression(max_iter=200)"));
        assert!(script.contains("model.fit(df, y_train)"));
    }

    #[test]
    fn random_forest_omits_absent_depth() {
        let script = compile_single("random_forest_classifier", &[]);
        assert!(script.contains("RandomForestClassifier(n_estimators=100)"));
        let script = compile_single("random_forest_classifier", &[("max_depth", json!(4))]);
        assert!(script.contains("RandomForestClassifier(n_estimators=100, max_depth=4)"));
    }

    #[test]
    fn kmeans_appends_a_cluster_column() {
        let script = compile_single("kmeans_cluster", &[("n_clusters", json!(3))]);
        assert!(script.contains("kmeans = KMeans(n_clusters=3, random_state=42, n_init=10)"));
        assert!(script.contains(
            "df_clustered['cluster'] = kmeans.fit_predict(df_clustered.select_dtypes(include='number'))"
        ));
    }

    #[test]
    fn cluster_count_below_two_degrades() {
        let mut registry = Registry::new();
        assert!(registry.register_all(definitions()).is_empty());
        let mut node = NodeInstance::new("n1", "kmeans_cluster");
        node.data.insert("n_clusters".to_string(), json!(1));
        let graph = GraphSpec {
            nodes: vec![node],
            edges: vec![],
        };
        let result = compile(&registry, &graph).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            result.errors[0].error,
            GenerateError::Validation(_)
        ));
    }
}
