//! Assembling class files by hand for tests

#![allow(dead_code)]

use byteorder::{BigEndian, WriteBytesExt};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_ABSTRACT: u16 = 0x0400;

/// Builds up the bytes of a class file, one constant or method at a time
pub struct ClassBuilder {
    constants: Vec<u8>,
    next_constant: u16,
    this_class: u16,
    super_class: u16,
    code_name: u16,
    method_count: u16,
    methods: Vec<u8>,
}

impl ClassBuilder {
    pub fn new(name: &str) -> ClassBuilder {
        let mut builder = ClassBuilder {
            constants: vec![],
            next_constant: 1,
            this_class: 0,
            super_class: 0,
            code_name: 0,
            method_count: 0,
            methods: vec![],
        };
        builder.this_class = builder.class(name);
        builder.super_class = builder.class("java/lang/Object");
        builder.code_name = builder.utf8("Code");
        builder
    }

    fn constant(&mut self, slots: u16) -> u16 {
        let index = self.next_constant;
        self.next_constant += slots;
        index
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        self.constants.push(1);
        self.constants
            .write_u16::<BigEndian>(text.len() as u16)
            .unwrap();
        self.constants.extend_from_slice(text.as_bytes());
        self.constant(1)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        self.constants.push(7);
        self.constants.write_u16::<BigEndian>(name).unwrap();
        self.constant(1)
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.constants.push(3);
        self.constants.write_i32::<BigEndian>(value).unwrap();
        self.constant(1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        self.constants.push(5);
        self.constants.write_i64::<BigEndian>(value).unwrap();
        self.constant(2)
    }

    pub fn string(&mut self, text: &str) -> u16 {
        let text = self.utf8(text);
        self.constants.push(8);
        self.constants.write_u16::<BigEndian>(text).unwrap();
        self.constant(1)
    }

    /// `Methodref` to a method in the given class
    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(class);
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.constants.push(12);
        self.constants.write_u16::<BigEndian>(name).unwrap();
        self.constants.write_u16::<BigEndian>(descriptor).unwrap();
        let name_and_type = self.constant(1);
        self.constants.push(10);
        self.constants.write_u16::<BigEndian>(class).unwrap();
        self.constants.write_u16::<BigEndian>(name_and_type).unwrap();
        self.constant(1)
    }

    /// Add a method with a `Code` attribute
    pub fn method(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        max_stack: u16,
        max_locals: u16,
        code: &[u8],
    ) -> &mut ClassBuilder {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let methods = &mut self.methods;
        methods.write_u16::<BigEndian>(access_flags).unwrap();
        methods.write_u16::<BigEndian>(name).unwrap();
        methods.write_u16::<BigEndian>(descriptor).unwrap();
        methods.write_u16::<BigEndian>(1).unwrap();
        methods.write_u16::<BigEndian>(self.code_name).unwrap();
        methods
            .write_u32::<BigEndian>(12 + code.len() as u32)
            .unwrap();
        methods.write_u16::<BigEndian>(max_stack).unwrap();
        methods.write_u16::<BigEndian>(max_locals).unwrap();
        methods.write_u32::<BigEndian>(code.len() as u32).unwrap();
        methods.extend_from_slice(code);
        methods.write_u16::<BigEndian>(0).unwrap(); // exception table
        methods.write_u16::<BigEndian>(0).unwrap(); // attributes
        self.method_count += 1;
        self
    }

    /// Add a method without any attributes
    pub fn abstract_method(&mut self, name: &str, descriptor: &str) -> &mut ClassBuilder {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let methods = &mut self.methods;
        methods
            .write_u16::<BigEndian>(ACC_PUBLIC | ACC_ABSTRACT)
            .unwrap();
        methods.write_u16::<BigEndian>(name).unwrap();
        methods.write_u16::<BigEndian>(descriptor).unwrap();
        methods.write_u16::<BigEndian>(0).unwrap();
        self.method_count += 1;
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE];
        bytes.write_u16::<BigEndian>(0).unwrap();
        bytes.write_u16::<BigEndian>(52).unwrap();
        bytes.write_u16::<BigEndian>(self.next_constant).unwrap();
        bytes.extend_from_slice(&self.constants);
        bytes
            .write_u16::<BigEndian>(ACC_PUBLIC | ACC_SUPER)
            .unwrap();
        bytes.write_u16::<BigEndian>(self.this_class).unwrap();
        bytes.write_u16::<BigEndian>(self.super_class).unwrap();
        bytes.write_u16::<BigEndian>(0).unwrap(); // interfaces
        bytes.write_u16::<BigEndian>(0).unwrap(); // fields
        bytes.write_u16::<BigEndian>(self.method_count).unwrap();
        bytes.extend_from_slice(&self.methods);
        bytes.write_u16::<BigEndian>(0).unwrap(); // attributes
        bytes
    }
}
