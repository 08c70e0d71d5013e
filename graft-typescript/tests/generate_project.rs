//! End-to-end generation runs against a small project on disk.

use std::{fs, path::PathBuf, sync::Arc};

use graft_codegen::{NoopTools, ProgressStep, StepStatus};
use graft_core::{
    ApiRequestSpec, Feature, HttpVerb, Injectable, InjectableCategory, NewInjectable, NewService,
    Optimization, RetryPolicy, ServerConfig,
};
use graft_manifest::{ApiServiceConfig, Manifest};
use graft_typescript::Project;
use serde_json::json;
use tempfile::TempDir;

const TYPES: &str = "\
export const ServiceTypes = {
  Auth: Symbol.for('Auth'),
};

export const DomainStoreTypes = {
  Cart: Symbol.for('Cart'),
};

export const ScreenStoreTypes = {};
";

const SERVICES: &str = "\
import { AuthService, IAuthService } from 'services/auth/AuthService';
import { ServiceTypes } from 'app/Types';

export function registerServices(): void {
  register<IAuthService, AuthService>(ServiceTypes.Auth);
}
";

const DOMAIN_STORES: &str = "\
import { CartStore, ICartStore } from 'stores/cart/CartStore';
import { DomainStoreTypes } from 'app/Types';

export function registerDomainStores(): void {
  register<ICartStore, CartStore>(DomainStoreTypes.Cart);
}
";

const SCREEN_STORES: &str = "\
import { ScreenStoreTypes } from 'app/Types';

export function registerScreenStores(): void {}
";

const OPTIMIZATIONS: &str = "\
export enum WarmLaunchOptimizations {
  Alpha = 'alpha',
}

export enum ColdLaunchOptimizations {}
";

const OPTIMIZATION_DEFAULTS: &str = "{\n  \"alpha\": {\n    \"experiment\": \"alpha\",\n    \"variables\": {}\n  }\n}\n";

const CONFIG_MODEL: &str = "\
@serializeAll
export class ConfigModel {
  @serializable
  @observable
  timeout: number = 30;
}
";

const CONFIG_DEFAULTS: &str = "\
export const ConfigDefaults = {
  timeout: 30,
};
";

/// A project tree with every file the default manifest points at.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let fixture = Self { dir };
        for (path, content) in [
            ("app/Types.ts", TYPES),
            ("app/DependencyContainer.Services.ts", SERVICES),
            ("app/DependencyContainer.DomainStores.ts", DOMAIN_STORES),
            ("app/DependencyContainer.ScreenStores.ts", SCREEN_STORES),
            ("optimizations/Optimizations.ts", OPTIMIZATIONS),
            ("optimizations/OptimizationDefaults.json", OPTIMIZATION_DEFAULTS),
            ("config/ConfigModel.ts", CONFIG_MODEL),
            ("config/ConfigDefaults.ts", CONFIG_DEFAULTS),
        ] {
            let path = fixture.src().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        fixture
    }

    fn src(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    fn read(&self, path: &str) -> String {
        fs::read_to_string(self.src().join(path)).unwrap()
    }

    fn project(&self) -> Project {
        self.project_with(Manifest::default())
    }

    fn project_with(&self, manifest: Manifest) -> Project {
        Project::new(manifest, self.dir.path(), Arc::new(NoopTools))
    }
}

fn profile_store(project: &Project) -> NewInjectable {
    NewInjectable::new(
        Injectable::new(
            "ProfileStore",
            "IProfileStore",
            "DomainStoreTypes.Profile",
            "stores/profile/ProfileStore",
        ),
        project
            .resolve_dependencies(&["ServiceTypes.Auth".to_string()])
            .unwrap(),
    )
}

/// Every snapshot the observer received, as `(description, status)` lists.
fn recorder(log: &mut Vec<Vec<(String, StepStatus)>>) -> impl FnMut(&[ProgressStep]) + '_ {
    move |steps: &[ProgressStep]| {
        log.push(
            steps
                .iter()
                .map(|s| (s.description().to_string(), s.status()))
                .collect(),
        )
    }
}

#[test]
fn test_available_injectables() {
    let fixture = Fixture::new();
    let services = fixture
        .project()
        .available_injectables(InjectableCategory::Service)
        .unwrap();
    assert_eq!(
        services,
        [Injectable::new(
            "AuthService",
            "IAuthService",
            "ServiceTypes.Auth",
            "services/auth/AuthService"
        )]
    );
}

#[test]
fn test_unknown_dependency_key() {
    let fixture = Fixture::new();
    let err = fixture
        .project()
        .resolve_dependencies(&["ServiceTypes.Missing".to_string()])
        .unwrap_err();
    assert_eq!(err.to_string(), "no registration found for 'ServiceTypes.Missing'");
}

#[test]
fn test_generate_domain_store() {
    let fixture = Fixture::new();
    let project = fixture.project();
    let item = profile_store(&project);

    let mut log = Vec::new();
    let generation = project
        .generate_injectable(InjectableCategory::DomainStore, &item, recorder(&mut log))
        .unwrap();

    let descriptions: Vec<_> = generation.steps.iter().map(|s| s.description()).collect();
    assert_eq!(
        descriptions,
        [
            "Adding DomainStoreTypes.Profile to App Types",
            "Adding DomainStoreTypes.Profile to Dependency Container",
            "Writing class file for stores/profile/ProfileStore.ts",
            "Copying and finalizing output",
        ]
    );
    assert!(generation.steps.iter().all(|s| s.status() == StepStatus::Complete));
    // Initial list plus two transitions per step
    assert_eq!(log.len(), 1 + 2 * 4);
    assert_eq!(generation.committed.len(), 3);
    assert!(generation.staged.is_empty());

    assert_eq!(
        fixture.read("app/Types.ts"),
        TYPES.replace(
            "  Cart: Symbol.for('Cart'),\n",
            "  Cart: Symbol.for('Cart'),\n  Profile: Symbol.for('Profile'),\n"
        )
    );

    insta::assert_snapshot!(fixture.read("app/DependencyContainer.DomainStores.ts"), @r"
    import { CartStore, ICartStore } from 'stores/cart/CartStore';
    import { DomainStoreTypes } from 'app/Types';
    import { IProfileStore, ProfileStore } from 'stores/profile/ProfileStore';

    export function registerDomainStores(): void {
      register<ICartStore, CartStore>(DomainStoreTypes.Cart);
      register<IProfileStore, ProfileStore>(DomainStoreTypes.Profile);
    }
    ");

    insta::assert_snapshot!(fixture.read("stores/profile/ProfileStore.ts"), @r"
    import { DomainStoreTypes, ServiceTypes } from 'app/Types';
    import { InjectableBase } from 'common/InjectableBase';
    import { IAuthService } from 'services/auth/AuthService';
    import { inject, injectable } from 'inversify';
    import { action, observable } from 'mobx';

    export interface IProfileStore {
      readonly initialized: boolean;
    }

    @injectable()
    export class ProfileStore extends InjectableBase implements IProfileStore {
      private authService: IAuthService;

      @observable
      private loaded = false;

      constructor(
        @inject(ServiceTypes.Auth) authService: IAuthService,
      ) {
        super(DomainStoreTypes.Profile);
        this.authService = authService;
        this.awaitDependenciesAndInit(DomainStoreTypes.Profile);
      }

      @action
      protected initDefaultValues(): void {
        this.loaded = false;
      }

      @action
      protected async init(): Promise<void> {
        // Load domain state here.
        // Every injected dependency has been initialized when this runs.
        this.loaded = true;
      }
    }
    ");
}

#[test]
fn test_zero_dependencies_leave_no_blocks() {
    let fixture = Fixture::new();
    let project = fixture.project();
    let item = NewInjectable::new(
        Injectable::new(
            "SettingsScreenStore",
            "ISettingsScreenStore",
            "ScreenStoreTypes.Settings",
            "screens/settings/SettingsScreenStore",
        ),
        Vec::new(),
    );
    project
        .generate_injectable(InjectableCategory::ScreenStore, &item, |_| {})
        .unwrap();

    let class = fixture.read("screens/settings/SettingsScreenStore.ts");
    assert!(!class.contains("__"));
    assert!(!class.contains("@inject("));
    assert!(!class.contains("private settingsScreenStore"));
    assert!(class.contains("import { ScreenStoreTypes } from 'app/Types';\n"));
    assert!(class.contains("  constructor(\n  ) {\n    super(ScreenStoreTypes.Settings);\n"));

    // The first registration goes inside the empty registering function
    insta::assert_snapshot!(fixture.read("app/DependencyContainer.ScreenStores.ts"), @r"
    import { ScreenStoreTypes } from 'app/Types';
    import { ISettingsScreenStore, SettingsScreenStore } from 'screens/settings/SettingsScreenStore';

    export function registerScreenStores(): void {
      register<ISettingsScreenStore, SettingsScreenStore>(ScreenStoreTypes.Settings);
    }
    ");
}

#[test]
fn test_duplicate_key_leaves_project_untouched() {
    let fixture = Fixture::new();
    let project = fixture.project();
    let item = NewInjectable::new(
        Injectable::new("CartStore", "ICartStore", "DomainStoreTypes.Cart", "stores/cart/Other"),
        Vec::new(),
    );

    let mut log = Vec::new();
    let err = project
        .generate_injectable(InjectableCategory::DomainStore, &item, recorder(&mut log))
        .unwrap_err();

    assert_eq!(err.to_string(), "Error generating domain store CartStore");
    let messages: Vec<String> = err.chain().map(ToString::to_string).collect();
    assert!(messages.contains(&"Adding DomainStoreTypes.Cart to App Types".to_string()));
    assert!(messages.contains(&"'Cart' already exists in DomainStoreTypes".to_string()));

    let last = log.last().unwrap();
    assert_eq!(last[0].1, StepStatus::Error);
    assert!(last[1..].iter().all(|(_, status)| *status == StepStatus::Incomplete));

    assert_eq!(fixture.read("app/Types.ts"), TYPES);
    assert_eq!(fixture.read("app/DependencyContainer.DomainStores.ts"), DOMAIN_STORES);
    assert!(!fixture.src().join("stores/cart/Other.ts").exists());
}

#[test]
fn test_existing_class_file_is_not_overwritten() {
    let fixture = Fixture::new();
    let project = fixture.project();
    let item = profile_store(&project);
    let class = fixture.src().join("stores/profile/ProfileStore.ts");
    fs::create_dir_all(class.parent().unwrap()).unwrap();
    fs::write(&class, "// hand written\n").unwrap();

    let err = project
        .generate_injectable(InjectableCategory::DomainStore, &item, |_| {})
        .unwrap_err();
    assert!(err.chain().any(|e| e.to_string().ends_with("already exists")));

    // Edits staged by earlier steps were never committed
    assert_eq!(fixture.read("app/Types.ts"), TYPES);
    assert_eq!(fixture.read("app/DependencyContainer.DomainStores.ts"), DOMAIN_STORES);
    assert_eq!(fs::read_to_string(&class).unwrap(), "// hand written\n");
}

#[test]
fn test_dry_run_stages_without_committing() {
    let fixture = Fixture::new();
    let project = fixture.project().dry_run(true);
    let item = profile_store(&project);

    let generation = project
        .generate_injectable(InjectableCategory::DomainStore, &item, |_| {})
        .unwrap();

    assert_eq!(generation.steps.len(), 3);
    assert!(generation.committed.is_empty());
    assert_eq!(generation.staged.len(), 3);
    for (destination, staged) in &generation.staged {
        assert!(staged.starts_with(fixture.dir.path().join(".graft/staging")));
        assert!(staged.exists());
        assert!(destination.starts_with(fixture.src()));
    }

    assert_eq!(fixture.read("app/Types.ts"), TYPES);
    assert!(!fixture.src().join("stores/profile/ProfileStore.ts").exists());
}

#[test]
fn test_generate_service_with_api() {
    let fixture = Fixture::new();
    let mut manifest = Manifest::default();
    manifest.api.imports =
        vec!["import { RetryPolicy, sendRequest } from 'services/networking';".to_string()];
    manifest.api.services.insert(
        "gwf".to_string(),
        ApiServiceConfig {
            expression: "AppInfoService.gwfServer()".to_string(),
            import: Some(
                "import { AppInfoService } from 'services/appinfo/AppInfoService';".to_string(),
            ),
        },
    );
    let project = fixture.project_with(manifest);

    let service = NewService {
        api_requests: vec![ApiRequestSpec {
            verb: HttpVerb::Get,
            target_service: "gwf".to_string(),
            method: "cart.get".to_string(),
            retry_policy: RetryPolicy::Once,
            function_name: "getCart".to_string(),
            request_interface_name: "IGetCartRequest".to_string(),
            response_interface_name: "IGetCartResponse".to_string(),
            request_schema_json: r#"{"id": 1}"#.to_string(),
            response_schema_json: r#"{"items": ["a"], "total": 2.5}"#.to_string(),
        }],
        ..NewService::new(NewInjectable::new(
            Injectable::new(
                "CartService",
                "ICartService",
                "ServiceTypes.Cart",
                "services/cart/CartService",
            ),
            Vec::new(),
        ))
    };

    let generation = project.generate_service(&service, |_| {}).unwrap();
    assert_eq!(
        generation.steps[3].description(),
        "Writing Api file for services/cart/CartServiceApi.ts"
    );

    let class = fixture.read("services/cart/CartService.ts");
    assert!(class.contains(
        "import { IGetCartRequest, IGetCartResponse } from './CartServiceApi';\n\
         import { RetryPolicy, sendRequest } from 'services/networking';\n\
         import { AppInfoService } from 'services/appinfo/AppInfoService';\n"
    ));
    assert!(class.contains("  public async getCart(\n    request: IGetCartRequest,\n"));
    assert!(class.contains("      service: AppInfoService.gwfServer(),\n      verb: 'GET',\n"));
    assert!(class.contains("      method: 'cart.get',\n"));
    assert!(class.contains("      retryPolicy: RetryPolicy.Once,\n"));
    assert!(!class.contains("__"));

    insta::assert_snapshot!(fixture.read("services/cart/CartServiceApi.ts"), @r"
    export interface IGetCartRequest {
      readonly id: number;
    }

    export interface IGetCartResponse {
      readonly items: string[];
      readonly total: number;
    }
    ");
}

#[test]
fn test_generate_feature() {
    let fixture = Fixture::new();
    let project = fixture.project();
    let feature = Feature {
        name: "Checkout".to_string(),
        configs: vec![ServerConfig {
            name: "checkoutBanner".to_string(),
            default_value: json!(true),
        }],
        optimizations: vec![
            Optimization {
                key: "Basket".to_string(),
                name: "basket".to_string(),
                variables: json!({ "size": 3 }),
                fetch_on_warm_launch: true,
            },
            Optimization {
                key: "Preload".to_string(),
                name: "preload".to_string(),
                variables: json!({}),
                fetch_on_warm_launch: false,
            },
        ],
    };

    let generation = project.generate_feature(&feature, |_| {}).unwrap();
    let descriptions: Vec<_> = generation.steps.iter().map(|s| s.description()).collect();
    assert_eq!(
        descriptions,
        [
            "Updating Optimizations",
            "Updating Optimization Defaults",
            "Updating Server Configs",
            "Updating Server Config Defaults",
            "Copying and finalizing output",
        ]
    );

    insta::assert_snapshot!(fixture.read("optimizations/Optimizations.ts"), @r"
    export enum WarmLaunchOptimizations {
      Alpha = 'alpha',
      Basket = 'basket',
    }

    export enum ColdLaunchOptimizations {
      Preload = 'preload',
    }
    ");

    let defaults: serde_json::Value =
        serde_json::from_str(&fixture.read("optimizations/OptimizationDefaults.json")).unwrap();
    assert_eq!(
        defaults,
        json!({
            "alpha": { "experiment": "alpha", "variables": {} },
            "basket": { "experiment": "basket", "variables": { "size": 3 } },
            "preload": { "experiment": "preload", "variables": {} },
        })
    );

    assert!(fixture.read("config/ConfigModel.ts").contains(
        "  timeout: number = 30;\n  @serializable\n  @observable\n  checkoutBanner: boolean = true;\n}\n"
    ));
    assert_eq!(
        fixture.read("config/ConfigDefaults.ts"),
        "export const ConfigDefaults = {\n  timeout: 30,\n  checkoutBanner: true,\n};\n"
    );
}

#[test]
fn test_feature_steps_for_empty_lists_are_omitted() {
    let fixture = Fixture::new();
    let feature = Feature {
        name: "Nothing".to_string(),
        ..Feature::default()
    };
    let generation = fixture.project().generate_feature(&feature, |_| {}).unwrap();
    let descriptions: Vec<_> = generation.steps.iter().map(|s| s.description()).collect();
    assert_eq!(descriptions, ["Copying and finalizing output"]);
    assert!(generation.committed.is_empty());
}

#[test]
fn test_duplicate_enum_key_leaves_file_unchanged() {
    let fixture = Fixture::new();
    let feature = Feature {
        name: "Again".to_string(),
        configs: Vec::new(),
        optimizations: vec![Optimization {
            key: "Alpha".to_string(),
            name: "alpha2".to_string(),
            variables: json!({}),
            fetch_on_warm_launch: true,
        }],
    };

    let err = fixture.project().generate_feature(&feature, |_| {}).unwrap_err();
    assert_eq!(err.to_string(), "Error generating feature Again");
    let root = err.root_cause().to_string();
    assert_eq!(root, "'Alpha' already exists in WarmLaunchOptimizations");

    assert_eq!(fixture.read("optimizations/Optimizations.ts"), OPTIMIZATIONS);
    assert_eq!(
        fixture.read("optimizations/OptimizationDefaults.json"),
        OPTIMIZATION_DEFAULTS
    );
}

#[test]
fn test_template_override() {
    let fixture = Fixture::new();
    let overrides = fixture.dir.path().join("templates/file");
    fs::create_dir_all(&overrides).unwrap();
    fs::write(
        overrides.join("ScreenStore.tpl"),
        "export class __NAME__ {}\n",
    )
    .unwrap();

    let mut manifest = Manifest::default();
    manifest.project.templates_dir = Some("templates".to_string());
    let project = fixture.project_with(manifest);
    let item = NewInjectable::new(
        Injectable::new("AboutScreenStore", "IAboutScreenStore", "ScreenStoreTypes.About", "About"),
        Vec::new(),
    );
    project
        .generate_injectable(InjectableCategory::ScreenStore, &item, |_| {})
        .unwrap();
    assert_eq!(fixture.read("About.ts"), "export class AboutScreenStore {}\n");
}
