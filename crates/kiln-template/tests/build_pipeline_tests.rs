//! End-to-end tests: template file on disk to prepared build plans.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use kiln_template::{
    Builder, ComponentFinder, ConfigMap, PostProcessor, PrepareError, Provisioner,
    parse_template_file,
};

#[derive(Debug, Default)]
struct Recorder {
    configs: Mutex<Vec<ConfigMap>>,
}

impl Recorder {
    fn record(&self, config: &ConfigMap) {
        self.configs.lock().unwrap().push(config.clone());
    }
}

impl Builder for Recorder {
    fn prepare(&self, config: &ConfigMap) -> anyhow::Result<Vec<String>> {
        self.record(config);
        Ok(Vec::new())
    }
}

impl Provisioner for Recorder {
    fn prepare(&self, config: &ConfigMap) -> anyhow::Result<()> {
        self.record(config);
        Ok(())
    }
}

impl PostProcessor for Recorder {
    fn configure(&self, config: &ConfigMap) -> anyhow::Result<()> {
        self.record(config);
        Ok(())
    }
}

fn finder(recorder: &Arc<Recorder>) -> ComponentFinder {
    let builder = Arc::clone(recorder);
    let provisioner = Arc::clone(recorder);
    let post_processor = Arc::clone(recorder);
    ComponentFinder::new()
        .with_builder(move |name| {
            matches!(name, "docker" | "qemu").then(|| Arc::clone(&builder) as Arc<dyn Builder>)
        })
        .with_provisioner(move |name| {
            (name == "shell").then(|| Arc::clone(&provisioner) as Arc<dyn Provisioner>)
        })
        .with_post_processor(move |name| {
            matches!(name, "compress" | "upload")
                .then(|| Arc::clone(&post_processor) as Arc<dyn PostProcessor>)
        })
}

const TEMPLATE: &str = r#"{
    "description": "base images",
    "variables": {
        "version": "1.0",
        "api_token": null
    },
    "builders": [
        {"name": "container", "type": "docker", "image": "alpine:3"},
        {"type": "qemu", "disk_size": 4096}
    ],
    "provisioners": [
        {"type": "shell", "inline": ["apk update"], "except": ["qemu"]},
        {
            "type": "shell",
            "script": "setup.sh",
            "override": {"qemu": {"script": "setup-vm.sh"}}
        }
    ],
    "post-processors": [
        ["compress", {"type": "upload", "only": ["qemu"], "keep_input_artifact": true}]
    ],
    "hooks": {"provision": ["notify"]}
}"#;

#[test]
fn file_template_compiles_every_build() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let path = dir.path().join("template.json");
    std::fs::write(&path, TEMPLATE).expect("write template");

    let template = parse_template_file(&path).expect("should parse");
    assert_eq!(template.build_names(), vec!["container", "qemu"]);
    assert_eq!(template.hooks["provision"], vec!["notify"]);

    let recorder = Arc::new(Recorder::default());
    let finder = finder(&recorder);

    let container = template.compile("container", &finder).expect("container");
    assert_eq!(container.builder_type(), "docker");
    assert_eq!(container.provisioners().len(), 2);
    assert_eq!(container.post_processors().len(), 1);
    assert_eq!(container.post_processors()[0].len(), 1);

    let qemu = template.compile("qemu", &finder).expect("qemu");
    assert_eq!(qemu.provisioners().len(), 1);
    assert_eq!(qemu.provisioners()[0].config["script"], "setup-vm.sh");
    let chain = &qemu.post_processors()[0];
    assert_eq!(chain.len(), 2);
    assert!(chain[1].keep_input_artifact);
}

#[test]
fn yaml_and_json_templates_compile_to_equal_plans() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let json_path = dir.path().join("template.json");
    let yaml_path = dir.path().join("template.yml");
    std::fs::write(&json_path, TEMPLATE).expect("write json");
    let value: serde_json::Value = serde_json::from_str(TEMPLATE).expect("valid json");
    std::fs::write(&yaml_path, serde_yaml::to_string(&value).expect("to yaml")).expect("write yaml");

    let from_json = parse_template_file(&json_path).expect("json parses");
    let from_yaml = parse_template_file(&yaml_path).expect("yaml parses");
    assert_eq!(from_json, from_yaml);

    let recorder = Arc::new(Recorder::default());
    let finder = finder(&recorder);
    assert_eq!(
        from_json.compile("qemu", &finder).expect("json plan"),
        from_yaml.compile("qemu", &finder).expect("yaml plan")
    );
}

#[test]
fn prepare_requires_declared_variables() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let path = dir.path().join("template.json");
    std::fs::write(&path, TEMPLATE).expect("write template");
    let template = parse_template_file(&path).expect("should parse");

    let recorder = Arc::new(Recorder::default());
    let plan = template
        .compile("container", &finder(&recorder))
        .expect("should compile");

    let err = plan.prepare(&HashMap::new()).unwrap_err();
    assert_eq!(
        err,
        PrepareError::MissingVariables {
            names: vec!["api_token".into()]
        }
    );

    let user = HashMap::from([("api_token".to_string(), "s3cr3t".to_string())]);
    let prepared = plan.prepare(&user).expect("should prepare");
    assert_eq!(prepared.variables["version"], "1.0");

    // builder + two provisioners + one post-processor
    let configs = recorder.configs.lock().unwrap();
    assert_eq!(configs.len(), 4);
    assert!(
        configs
            .iter()
            .all(|c| c["packer_user_variables"]["api_token"] == "s3cr3t")
    );
}
