use classrun::jvm::{BaseType, ClassFile, FieldType, MethodDescriptor, ParseDescriptor};
use classrun::runtime::{Reference, Settings, StackElement, Thread, Value};
use classrun::*;

use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, Command};

fn main() -> Result<(), Error> {
    env_logger::init();

    let mut command = Command::new("Class file runner")
        .version("0.1.0")
        .author("Alec Theriault <alec.theriault@gmail.com>")
        .about("Decode a JVM class file and run its static methods")
        .arg(
            Arg::new("invoke")
                .long("invoke")
                .value_name("NAME:DESCRIPTOR")
                .required(false)
                .help("Run this static method (eg. `fact:(I)I`) instead of printing a summary"),
        )
        .arg(
            Arg::new("arg")
                .long("arg")
                .value_name("VALUE")
                .action(ArgAction::Append)
                .help("Argument to pass to the invoked method (repeat for each parameter)"),
        )
        .arg(
            Arg::new("max call depth")
                .long("max-call-depth")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .default_value("1024")
                .help("Maximum number of nested calls before giving up"),
        )
        .arg(
            Arg::new("INPUT")
                .help("Sets the input class file to use")
                .required(true)
                .index(1),
        );
    let matches = command.get_matches_mut();

    let class_file = matches
        .get_one::<String>("INPUT")
        .expect("INPUT is required");
    log::info!("Reading '{}'", class_file);
    let class = ClassFile::read_from_path(class_file)?;

    let method = match matches.get_one::<String>("invoke") {
        None => return print_summary(&class),
        Some(method) => method,
    };
    let (name, descriptor) = match method.split_once(":(") {
        Some((name, rest)) => (name, format!("({}", rest)),
        None => command
            .error(
                ErrorKind::ValueValidation,
                format!("expected `NAME:DESCRIPTOR`, got `{}`", method),
            )
            .exit(),
    };
    let parsed_descriptor = match MethodDescriptor::parse(&descriptor) {
        Ok(parsed) => parsed,
        Err(err) => command.error(ErrorKind::ValueValidation, err).exit(),
    };

    let raw_args: Vec<&String> = matches
        .get_many::<String>("arg")
        .map_or_else(Vec::new, |args| args.collect());
    if raw_args.len() != parsed_descriptor.parameters.len() {
        command
            .error(
                ErrorKind::WrongNumberOfValues,
                format!(
                    "`{}` takes {} arguments but {} were given",
                    method,
                    parsed_descriptor.parameters.len(),
                    raw_args.len()
                ),
            )
            .exit();
    }
    let mut args = vec![];
    for (raw_arg, parameter) in raw_args.iter().zip(&parsed_descriptor.parameters) {
        match parse_argument(raw_arg, parameter) {
            Some(arg) => args.push(arg),
            None => command
                .error(
                    ErrorKind::ValueValidation,
                    format!("`{}` is not a valid {:?}", raw_arg, parameter),
                )
                .exit(),
        }
    }

    let settings = Settings {
        max_call_depth: *matches
            .get_one::<usize>("max call depth")
            .unwrap_or(&Settings::DEFAULT_MAX_CALL_DEPTH),
        ..Settings::default()
    };
    let mut thread = Thread::new(&class, settings);
    log::info!("Invoking '{}'", method);
    let result = thread.invoke_and_run(name, &descriptor, args)?;

    match (result, &parsed_descriptor.return_type) {
        (Some(result), Some(return_type)) => println!("{}", render_value(result, return_type)),
        _ => println!("void"),
    }
    Ok(())
}

/// Parse a command line argument as a value of the given type
fn parse_argument(raw: &str, field_type: &FieldType) -> Option<StackElement> {
    let element = match field_type {
        FieldType::Base(BaseType::Int) => raw.parse::<i32>().ok()?.into_element(),
        FieldType::Base(BaseType::Long) => raw.parse::<i64>().ok()?.into_element(),
        FieldType::Base(BaseType::Float) => raw.parse::<f32>().ok()?.into_element(),
        FieldType::Base(BaseType::Double) => raw.parse::<f64>().ok()?.into_element(),
        FieldType::Base(BaseType::Byte) => raw.parse::<i8>().ok()?.into_element(),
        FieldType::Base(BaseType::Short) => raw.parse::<i16>().ok()?.into_element(),
        FieldType::Base(BaseType::Boolean) => raw.parse::<bool>().ok()?.into_element(),
        FieldType::Base(BaseType::Char) => {
            let mut chars = raw.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            u16::try_from(u32::from(c)).ok()?.into_element()
        }
        FieldType::Object(_) | FieldType::Array(_) if raw == "null" => {
            Reference::NULL.into_element()
        }
        FieldType::Object(_) | FieldType::Array(_) => {
            Reference(raw.parse::<u32>().ok()?).into_element()
        }
    };
    Some(element)
}

/// Render a returned value according to the return type
fn render_value(element: StackElement, field_type: &FieldType) -> String {
    let rendered = match field_type {
        FieldType::Base(BaseType::Int) => i32::from_element(element).map(|v| v.to_string()),
        FieldType::Base(BaseType::Long) => i64::from_element(element).map(|v| v.to_string()),
        FieldType::Base(BaseType::Float) => f32::from_element(element).map(|v| v.to_string()),
        FieldType::Base(BaseType::Double) => f64::from_element(element).map(|v| v.to_string()),
        FieldType::Base(BaseType::Byte) => i8::from_element(element).map(|v| v.to_string()),
        FieldType::Base(BaseType::Short) => i16::from_element(element).map(|v| v.to_string()),
        FieldType::Base(BaseType::Boolean) => bool::from_element(element).map(|v| v.to_string()),
        FieldType::Base(BaseType::Char) => u16::from_element(element).map(|v| {
            char::from_u32(u32::from(v)).map_or_else(|| format!("\\u{:04x}", v), String::from)
        }),
        FieldType::Object(_) | FieldType::Array(_) => {
            Reference::from_element(element).map(|r| {
                if r.is_null() {
                    String::from("null")
                } else {
                    format!("@{}", r.0)
                }
            })
        }
    };
    rendered.unwrap_or_else(|_| element.to_string())
}

/// Print the class declaration and its members
fn print_summary(class: &ClassFile) -> Result<(), Error> {
    let constants = &class.constants;

    println!("version: {}", class.version);
    println!("flags: {:?}", class.access_flags);
    println!("class: {}", class.this_class_name()?);
    if let Some(super_class) = class.super_class_name()? {
        println!("extends: {}", super_class);
    }
    for interface in class.interface_names()? {
        println!("implements: {}", interface);
    }
    if let Some(source_file) = class.source_file()? {
        println!("source: {}", source_file);
    }
    println!("constants: {}", constants.len());

    for field in &class.fields {
        println!(
            "field {}:{} ({:?})",
            field.name(constants)?,
            field.descriptor(constants)?,
            field.access_flags
        );
    }
    for method in &class.methods {
        let code_size = method
            .code(constants)?
            .map_or_else(
                || String::from("no code"),
                |code| format!("{} bytes", code.code_array.len()),
            );
        println!(
            "method {}:{} ({:?}, {})",
            method.name(constants)?,
            method.descriptor(constants)?,
            method.access_flags,
            code_size
        );
    }
    Ok(())
}
