// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Cycles, extension handlers, native modules, lookup paths and threads

mod common;

use common::{path_string, Fixture, ScriptedEngine};
use mooring_cjs::{
    BuiltinModules, ExtensionRegistry, Handler, ModuleError, ModuleLoader, Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn cyclic_engine() -> ScriptedEngine {
    ScriptedEngine::new()
        .script("cycle_a", |scope| {
            scope.export("started", true);
            let b = scope.require("./cycle_b")?;
            scope.export("b", b);
            scope.export("done", true);
            Ok(())
        })
        .script("cycle_b", |scope| {
            let a = scope.require("./cycle_a")?;
            let a_key = scope.require.resolve("./cycle_a")?;
            let a_loaded = scope
                .require
                .cache()
                .get(&a_key)
                .map(|module| module.is_loaded())
                .unwrap_or(true);

            scope.export("a_started_when_seen", a.get("started"));
            scope.export("a_done_when_seen", a.get("done").is_undefined());
            scope.export("a_loaded_when_seen", a_loaded);
            scope.export("a", a);
            Ok(())
        })
}

#[test]
fn test_cycle_returns_partial_exports() {
    let fixture = Fixture::new();
    fixture.file("cycle_a.js", "cycle_a").file("cycle_b.js", "cycle_b");
    let loader = fixture.loader(cyclic_engine());

    let a = loader.require("./cycle_a").unwrap();
    let b = a.get("b");

    assert_eq!(a.get("done"), Value::Boolean(true));
    assert_eq!(b.get("a_started_when_seen"), Value::Boolean(true));
    assert_eq!(b.get("a_done_when_seen"), Value::Boolean(true));
    assert_eq!(b.get("a_loaded_when_seen"), Value::Boolean(false));
    // B held on to A's exports object itself, which has since completed
    assert_eq!(b.get("a"), a);
    assert_eq!(b.get("a").get("done"), Value::Boolean(true));

    let module_a = loader.cache().get(fixture.path("cycle_a.js")).unwrap();
    let module_b = loader.cache().get(fixture.path("cycle_b.js")).unwrap();
    assert!(module_a.is_loaded() && module_b.is_loaded());
    assert_eq!(module_a.children().len(), 1);
    assert!(module_b.children().is_empty());
    assert_eq!(module_b.parent().unwrap().id(), fixture.path("cycle_a.js"));
}

#[test]
fn test_self_require() {
    let fixture = Fixture::new();
    fixture.file("narcissus.js", "narcissus");
    let loader = fixture.loader(ScriptedEngine::new().script("narcissus", |scope| {
        scope.export("before", true);
        let me = scope.require("./narcissus")?;
        scope.export("saw_before", me.get("before"));
        scope.export("same_object", me == scope.exports);
        Ok(())
    }));

    let exports = loader.require("./narcissus").unwrap();
    assert_eq!(exports.get("saw_before"), Value::Boolean(true));
    assert_eq!(exports.get("same_object"), Value::Boolean(true));
}

#[test]
fn test_extension_precedence() {
    let fixture = Fixture::new();
    fixture
        .file("foo.js", "foo_js")
        .file("foo.json", r#"{"from": "json"}"#);
    let engine = ScriptedEngine::new().script("foo_js", |scope| {
        scope.export("from", "js");
        Ok(())
    });

    let loader = fixture.loader(engine.clone());
    assert_eq!(loader.require("./foo").unwrap().get("from").as_str(), Some("js"));

    let json_first = ExtensionRegistry::empty();
    json_first.register(".json", Handler::Data);
    json_first.register(".js", Handler::Code);
    let loader = ModuleLoader::builder(engine)
        .config(fixture.config())
        .extensions(json_first)
        .build();
    assert_eq!(loader.require("./foo").unwrap().get("from").as_str(), Some("json"));
}

#[test]
fn test_custom_extension_handler() {
    let fixture = Fixture::new();
    fixture.file("notes.txt", "hello world");
    let loader = fixture.loader(ScriptedEngine::new());

    // Not registered yet: probing never tries .txt
    assert!(loader.require("./notes").unwrap_err().is_not_found());

    loader.root_require().extensions().register(
        ".txt",
        Handler::custom(|_, module, content| {
            module.set_exports(Value::from(content.to_uppercase()));
            Ok(())
        }),
    );

    assert_eq!(loader.require("./notes").unwrap(), Value::from("HELLO WORLD"));
    assert_eq!(loader.extensions().extensions(), vec![".js", ".json", ".txt"]);
}

#[test]
fn test_custom_handler_can_compile() {
    let fixture = Fixture::new();
    fixture.file("greeting.shout", "  greeting  ");
    let loader = fixture.loader(ScriptedEngine::new().script("GREETING", |scope| {
        scope.export("compiled_from", path_string(&scope.filename));
        Ok(())
    }));

    loader.extensions().register(
        ".shout",
        Handler::custom(|loader, module, content| {
            loader.compile(module, &content.trim().to_uppercase())
        }),
    );

    let exports = loader.require("./greeting.shout").unwrap();
    assert_eq!(
        exports.get("compiled_from").as_str().unwrap(),
        path_string(&fixture.path("greeting.shout"))
    );
}

#[test]
fn test_unregistered_extension_runs_as_code() {
    let fixture = Fixture::new();
    fixture.file("tool.mjs", "tool");
    let loader = fixture.loader(ScriptedEngine::new().script("tool", |scope| {
        scope.export("ran", true);
        Ok(())
    }));

    assert_eq!(loader.require("./tool.mjs").unwrap().get("ran"), Value::Boolean(true));
}

#[test]
fn test_native_modules_bypass_files() {
    let fixture = Fixture::new();
    fixture
        .file("node_modules/events/index.js", "events_js")
        .file("lib/util.js", "util_js");

    let events = Value::object();
    let builtins = BuiltinModules::new().with_module("events", events.clone());
    let loader = ModuleLoader::builder(ScriptedEngine::new().script("util_js", |scope| {
        scope.export("file", true);
        Ok(())
    }))
    .config(fixture.config())
    .native(builtins)
    .build();

    assert_eq!(loader.require("events").unwrap(), events);
    assert_eq!(loader.root_require().resolve("events").unwrap(), "events");
    assert!(loader.cache().is_empty());

    // Only bare specifiers are offered to the native lookup
    let util = loader.require("./lib/util").unwrap();
    assert_eq!(util.get("file"), Value::Boolean(true));
}

#[test]
fn test_node_modules_lookup() {
    let fixture = Fixture::new();
    fixture
        .file("node_modules/left-pad/package.json", r#"{"main": "pad"}"#)
        .file("node_modules/left-pad/pad.js", "left_pad")
        .file("src/app.js", "app");
    let loader = fixture.loader(
        ScriptedEngine::new()
            .script("left_pad", |scope| {
                scope.export("name", "left-pad");
                Ok(())
            })
            .script("app", |scope| {
                let pad = scope.require("left-pad")?;
                scope.export("pad", pad);
                Ok(())
            }),
    );

    let app = loader.require("./src/app").unwrap();
    assert_eq!(app.get("pad").get("name").as_str(), Some("left-pad"));
    assert!(loader
        .cache()
        .contains(fixture.path("node_modules/left-pad/pad.js")));
}

#[test]
fn test_search_paths() {
    let fixture = Fixture::new();
    fixture
        .file("vendor/shared.js", "shared")
        .file("plugins/extra/index.js", "extra")
        .file("app/main.js", "main");

    let mut config = fixture.config();
    config.search_paths = vec![fixture.path("vendor")];
    let loader = ModuleLoader::builder(
        ScriptedEngine::new()
            .script("shared", |scope| {
                scope.export("shared", true);
                Ok(())
            })
            .script("extra", |scope| {
                scope.export("extra", true);
                Ok(())
            })
            .script("main", |scope| {
                scope.export("shared", scope.require("shared")?.get("shared"));
                Ok(())
            }),
    )
    .config(config)
    .build();

    let main = loader.require("./app/main").unwrap();
    assert_eq!(main.get("shared"), Value::Boolean(true));

    let require = loader.root_require();
    assert!(require.call("extra").unwrap_err().is_not_found());
    require.push_search_path(fixture.path("plugins"));
    assert_eq!(require.search_paths().len(), 2);
    assert_eq!(require.call("extra").unwrap().get("extra"), Value::Boolean(true));
}

#[test]
fn test_run_main() {
    let fixture = Fixture::new();
    fixture
        .file("main.js", "main")
        .file("lib/helper.js", "helper");
    let loader = fixture.loader(
        ScriptedEngine::new()
            .script("main", |scope| {
                scope.export("helper", scope.require("./lib/helper")?);
                Ok(())
            })
            .script("helper", |scope| {
                let main_id = scope
                    .require
                    .main()
                    .map(|main| path_string(main.id()))
                    .unwrap_or_default();
                scope.export("main_id", main_id);
                Ok(())
            }),
    );

    let main = loader.run_main("main.js").unwrap();
    assert_eq!(main.id(), fixture.path("main.js"));
    assert!(main.parent().is_none());
    assert!(main.is_loaded());
    assert_eq!(
        main.exports().get("helper").get("main_id").as_str().unwrap(),
        path_string(&fixture.path("main.js"))
    );
    assert!(Arc::ptr_eq(&loader.main().unwrap(), &main));

    let helper = loader.cache().get(fixture.path("lib/helper.js")).unwrap();
    assert!(Arc::ptr_eq(&helper.parent().unwrap(), &main));
}

#[test]
fn test_run_main_on_cached_module() {
    let fixture = Fixture::new();
    fixture
        .file("main.js", "main")
        .file("b.js", "b")
        .file("a.js", "a");
    let loader = fixture.loader(
        ScriptedEngine::new()
            .script("main", |_| Ok(()))
            .script("a", |_| Ok(()))
            .script("b", |scope| {
                scope.export("a", scope.require("./a")?);
                Ok(())
            }),
    );

    let exports = loader.require("./main").unwrap();
    let main = loader.run_main("main.js").unwrap();
    assert_eq!(main.exports(), exports);
    assert!(Arc::ptr_eq(&loader.main().unwrap(), &main));

    // A later entry replaces the earlier one even when already loaded
    loader.run_main("b.js").unwrap();
    let a = loader.run_main("a.js").unwrap();
    assert_eq!(loader.main().unwrap().id(), fixture.path("a.js"));
    assert!(Arc::ptr_eq(&loader.main().unwrap(), &a));
}

#[test]
fn test_failed_main_is_cleared() {
    let fixture = Fixture::new();
    fixture.file("main.js", "main");
    let loader = fixture.loader(ScriptedEngine::new().script("main", |_| {
        Err(ModuleError::Thrown(Value::from("startup failed")))
    }));

    assert!(matches!(loader.run_main("main"), Err(ModuleError::Thrown(_))));
    assert!(loader.main().is_none());
    assert!(loader.cache().is_empty());
}

#[test]
fn test_concurrent_first_loads_execute_once() {
    let fixture = Fixture::new();
    fixture.file("slow.js", "slow");
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let loader = fixture.loader(ScriptedEngine::new().script("slow", move |scope| {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        scope.export("ready", true);
        Ok(())
    }));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let loader = loader.clone();
            thread::spawn(move || loader.require("./slow").map(|_| ()))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(loader.cache().len(), 1);
    assert_eq!(loader.require("./slow").unwrap().get("ready"), Value::Boolean(true));
}
