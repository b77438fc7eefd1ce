//! Demo entry point.
//!
//! # Responsibility
//! - Walk through attribute declaration, lazy defaults, overrides, and a
//!   rejected assignment using `interfacer_core`.
//! - Keep output deterministic apart from clock readings.
//!
//! Logging is configured with `INTERFACER_LOG_LEVEL` and
//! `INTERFACER_LOG_DIR` (absolute; unset means stderr).

mod adapters;

use adapters::{ClockClass, JsonAdapter, PostRepository};
use interfacer_core::{
    core_version, default_log_level, downcast_value, init_logging, Accessor, AttributeSlots,
    DynObject, InMemoryModuleLoader, Interfaced, ModuleLoader, TypeDescriptor, TypeRegistry, Value,
};
use log::info;
use std::error::Error;
use std::rc::Rc;

type DemoResult<T = ()> = Result<T, Box<dyn Error>>;

fn main() -> DemoResult {
    let level = std::env::var("INTERFACER_LOG_LEVEL")
        .unwrap_or_else(|_| default_log_level().to_string());
    let log_dir = std::env::var("INTERFACER_LOG_DIR").unwrap_or_default();
    if let Err(err) = init_logging(&level, &log_dir) {
        eprintln!("logging disabled: {err}");
    }
    info!("event=cli_start module=cli status=ok version={}", core_version());

    let mut types = TypeRegistry::new();
    publish_posts(&mut types)?;
    round_trip_json(&mut types)?;
    swap_task_class(&mut types)?;
    Ok(())
}

#[derive(Default)]
struct Post {
    slots: AttributeSlots,
}

impl Interfaced for Post {
    fn attribute_slots(&self) -> &AttributeSlots {
        &self.slots
    }
}

fn publish(post: &Post, time_class: &Accessor<Post>) -> DemoResult {
    let value = time_class.get(post).ok_or("time_class has no value")?;
    let clock = downcast_value::<ClockClass>(&value).ok_or("time_class is not a clock")?;
    println!(
        "~ Post has been published at {} (using {}).",
        clock.now(),
        value.describe()
    );
    Ok(())
}

fn publish_posts(types: &mut TypeRegistry) -> DemoResult {
    let time_class = types
        .interface::<Post>()
        .declare_attribute_with_default("time_class", &[".now", "#to_s"], || {
            let time: Value = Rc::new(ClockClass::time());
            time
        })?;

    println!("~ With the default time_class.");
    publish(&Post::default(), &time_class)?;

    println!("\n~ With overridden time_class.");
    let post = Post::default();
    time_class.set(&post, Rc::new(ClockClass::date_time()))?;
    publish(&post, &time_class)?;

    println!("\n~ With a time_class missing its interface.");
    let stopwatch: Value = TypeDescriptor::builder("Stopwatch")
        .instance_operation("to_s")
        .build();
    if let Err(err) = time_class.set(&post, stopwatch) {
        println!("rejected: {err}");
    }
    publish(&post, &time_class)
}

#[derive(Default)]
struct PostFeed {
    slots: AttributeSlots,
}

impl Interfaced for PostFeed {
    fn attribute_slots(&self) -> &AttributeSlots {
        &self.slots
    }
}

fn build_modules() -> DemoResult<InMemoryModuleLoader> {
    let mut modules = InMemoryModuleLoader::new();
    modules.define("registry", |_| {
        let json_adapter: Value = Rc::new(JsonAdapter::compact());
        let post_repository: Value = Rc::new(PostRepository);
        Ok(vec![
            ("json_adapter".to_string(), json_adapter),
            ("post_repository".to_string(), post_repository),
        ])
    })?;
    modules.define("adapters/pretty", |_| {
        let adapter: Value = Rc::new(JsonAdapter::pretty());
        Ok(vec![("adapter".to_string(), adapter)])
    })?;
    Ok(modules)
}

fn round_trip_json(types: &mut TypeRegistry) -> DemoResult {
    let modules = build_modules()?;
    let registry = modules.load_module("registry")?;
    let default_adapter = registry.symbol("json_adapter")?;
    let default_repository = registry.symbol("post_repository")?;

    let mut feed_interface = types.interface::<PostFeed>();
    let json_adapter = feed_interface
        .declare_attribute_with_default("json_adapter", &["parse", "generate"], move || {
            Rc::clone(&default_adapter)
        })?;
    let post_repository = feed_interface
        .declare_attribute_with_default("post_repository", &["retrieve"], move || {
            Rc::clone(&default_repository)
        })?;

    let feed = PostFeed::default();
    print_feed(&feed, &json_adapter, &post_repository)?;

    let pretty = modules.load_module("adapters/pretty")?.symbol("adapter")?;
    let feed = PostFeed::default();
    json_adapter.set(&feed, pretty)?;
    print_feed(&feed, &json_adapter, &post_repository)
}

fn print_feed(
    feed: &PostFeed,
    json_adapter: &Accessor<PostFeed>,
    post_repository: &Accessor<PostFeed>,
) -> DemoResult {
    let adapter_value = json_adapter.get(feed).ok_or("json_adapter has no value")?;
    let repository_value = post_repository
        .get(feed)
        .ok_or("post_repository has no value")?;
    let adapter =
        downcast_value::<JsonAdapter>(&adapter_value).ok_or("json_adapter is not a JsonAdapter")?;
    let repository = downcast_value::<PostRepository>(&repository_value)
        .ok_or("post_repository is not a PostRepository")?;

    println!("\n~ Using {}.", adapter_value.describe());
    let posts = adapter.parse(repository.retrieve())?;
    println!("Data: {posts}");
    println!("JSON: {}", adapter.generate(&posts)?);
    Ok(())
}

#[derive(Default)]
struct TaskList {
    slots: AttributeSlots,
    tasks: Vec<(String, String)>,
}

impl Interfaced for TaskList {
    fn attribute_slots(&self) -> &AttributeSlots {
        &self.slots
    }
}

impl TaskList {
    fn push(&mut self, task_class: &Accessor<TaskList>, text: &str) -> DemoResult {
        let class = task_class.get(self).ok_or("task_class has no value")?;
        let descriptor =
            downcast_value::<TypeDescriptor>(&class).ok_or("task_class is not a type")?;
        self.tasks
            .push((descriptor.name().to_string(), text.to_string()));
        Ok(())
    }

    fn print(&self) {
        let rendered: Vec<String> = self
            .tasks
            .iter()
            .map(|(class, text)| format!("{class}: <{text}>"))
            .collect();
        println!("[{}]", rendered.join(", "));
    }
}

fn swap_task_class(types: &mut TypeRegistry) -> DemoResult {
    let task: Rc<TypeDescriptor> = TypeDescriptor::builder("Task")
        .static_operation("new")
        .instance_operation("text")
        .build();
    let default_task = Rc::clone(&task);
    let task_class = types
        .interface::<TaskList>()
        .declare_attribute_with_default("task_class", &["new"], move || {
            let value: Value = default_task.clone();
            value
        })?;

    println!();
    let mut list = TaskList::default();
    for text in ["Make example 1", "Make example 2", "Make example 3"] {
        list.push(&task_class, text)?;
    }
    list.print();

    let my_task = TypeDescriptor::builder("MyTask")
        .parent(task)
        .instance_operation("inspect")
        .build();
    let mut list = TaskList::default();
    task_class.set(&list, my_task)?;
    for text in ["Make example 1", "Make example 2"] {
        list.push(&task_class, text)?;
    }
    list.print();

    let lone_task: Value = Rc::new(DynObject::new(
        TypeDescriptor::builder("Task").instance_operation("text").build(),
    ));
    if let Err(err) = task_class.set(&list, lone_task) {
        println!("rejected: {err}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::TaskList;
    use interfacer_core::{TypeDescriptor, TypeRegistry, Value};
    use std::rc::Rc;

    #[test]
    fn task_list_records_the_current_task_class_name() {
        let task = TypeDescriptor::builder("Task").static_operation("new").build();
        let default_task = Rc::clone(&task);
        let mut types = TypeRegistry::new();
        let task_class = types
            .interface::<TaskList>()
            .declare_attribute_with_default("task_class", &["new"], move || {
                let value: Value = default_task.clone();
                value
            })
            .expect("declaration");

        let mut list = TaskList::default();
        list.push(&task_class, "first").expect("default task class");
        let my_task = TypeDescriptor::builder("MyTask").parent(task).build();
        task_class.set(&list, my_task).expect("subtype conforms");
        list.push(&task_class, "second").expect("swapped task class");

        assert_eq!(
            list.tasks,
            vec![
                ("Task".to_string(), "first".to_string()),
                ("MyTask".to_string(), "second".to_string()),
            ]
        );
    }
}
