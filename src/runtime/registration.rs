use std::path::Path;

use super::Interpreter;
use crate::trace::trace_log;
use crate::value::{ClassData, ModuleData, Obj, ObjRef, Payload, RuntimeError};

impl Interpreter {
    /// Construct the builtin type graph. The graph is cyclic on purpose:
    /// Class is an instance of itself, Kernel is included into both Object
    /// and Module, and Class descends from Module. The wiring therefore runs
    /// in two passes — allocate everything raw, then link — and must happen
    /// exactly once per interpreter, before any user code.
    pub(super) fn bootstrap(&mut self, home: &Path) {
        assert!(self.classes.is_empty(), "bootstrap is not re-entrant");
        trace_log!("bootstrap", "wiring builtin type graph");

        // Allocate pass: the four core cells exist, unlinked.
        let basic_object = self
            .heap
            .alloc(Obj::raw(Payload::Class(ClassData::new("BasicObject", None))));
        let object = self
            .heap
            .alloc(Obj::raw(Payload::Class(ClassData::new("Object", None))));
        let class = self
            .heap
            .alloc(Obj::raw(Payload::Class(ClassData::new("Class", None))));
        let module = self
            .heap
            .alloc(Obj::raw(Payload::Class(ClassData::new("Module", None))));
        self.classes.insert("BasicObject".to_string(), basic_object);
        self.classes.insert("Object".to_string(), object);
        self.classes.insert("Class".to_string(), class);
        self.classes.insert("Module".to_string(), module);

        // Shared behavior modules; module values are instances of Module.
        let kernel = self
            .heap
            .alloc(Obj::new(module, Payload::Module(ModuleData::new("Kernel"))));
        let comparable = self.heap.alloc(Obj::new(
            module,
            Payload::Module(ModuleData::new("Comparable")),
        ));
        let process = self
            .heap
            .alloc(Obj::new(module, Payload::Module(ModuleData::new("Process"))));
        self.modules.insert("Kernel".to_string(), kernel);
        self.modules.insert("Comparable".to_string(), comparable);
        self.modules.insert("Process".to_string(), process);
        self.kernel_ref = kernel;

        // Link pass: close the cycle. Every core cell is an instance of
        // Class, Kernel lands in both Object and Module, and the superclass
        // chain becomes Class -> Module -> Object -> BasicObject -> none.
        for core in [basic_object, object, class, module] {
            self.heap.get_mut(core).class = Some(class);
        }
        self.class_data_mut_of(object).includes.push(kernel);
        self.class_data_mut_of(module).includes.push(kernel);
        self.class_data_mut_of(class).superclass = Some(module);
        self.class_data_mut_of(module).superclass = Some(object);
        self.class_data_mut_of(object).superclass = Some(basic_object);

        // Remaining builtin classes, each instantiated through its own `new`.
        let io = self.define_builtin_class("IO", object);
        let array = self.define_builtin_class("Array", object);
        let hash = self.define_builtin_class("Hash", object);
        let true_class = self.define_builtin_class("True", object);
        let file = self.define_builtin_class("File", io);
        let false_class = self.define_builtin_class("False", object);
        let nil_class = self.define_builtin_class("Nil", object);
        let string = self.define_builtin_class("String", object);
        let fixnum = self.define_builtin_class("Fixnum", object);
        let float = self.define_builtin_class("Float", object);
        let symbol = self.define_builtin_class("Symbol", object);

        self.nil_ref = self.heap.alloc(Obj::new(nil_class, Payload::Nil));
        self.true_ref = self.heap.alloc(Obj::new(true_class, Payload::Bool(true)));
        self.false_ref = self.heap.alloc(Obj::new(false_class, Payload::Bool(false)));

        // Boolean algebra on the singletons.
        self.add_instance_method(true_class, "&", |vm, _receiver, args| {
            let other = args.first().copied().unwrap_or(vm.nil_ref);
            Ok(vm.bool_ref(vm.truthy(other)))
        });
        self.add_instance_method(true_class, "|", |vm, _receiver, _args| Ok(vm.true_ref));
        self.add_instance_method(false_class, "&", |vm, _receiver, _args| Ok(vm.false_ref));
        self.add_instance_method(false_class, "|", |vm, _receiver, args| {
            let other = args.first().copied().unwrap_or(vm.nil_ref);
            Ok(vm.bool_ref(vm.truthy(other)))
        });

        // Factories whose instances are not plain objects. The boolean and
        // nil factories hand back the singletons.
        self.add_own_method(true_class, "new", |vm, _recv, _args| Ok(vm.true_ref));
        self.add_own_method(false_class, "new", |vm, _recv, _args| Ok(vm.false_ref));
        self.add_own_method(nil_class, "new", |vm, _recv, _args| Ok(vm.nil_ref));
        self.add_own_method(string, "new", |vm, _recv, _args| Ok(vm.alloc_str("")));
        self.add_own_method(array, "new", |vm, _recv, _args| Ok(vm.alloc_array(Vec::new())));
        self.add_own_method(hash, "new", |vm, _recv, _args| Ok(vm.alloc_hash(Vec::new())));
        self.add_own_method(fixnum, "new", |vm, _recv, _args| Ok(vm.alloc_fixnum(0)));
        self.add_own_method(float, "new", |vm, _recv, _args| Ok(vm.alloc_float(0.0)));
        self.add_own_method(symbol, "new", |vm, _recv, _args| Ok(vm.intern_symbol("")));
        self.add_own_method(object, "new", |vm, recv, _args| Ok(vm.alloc_instance(recv)));
        self.add_own_method(basic_object, "new", |vm, recv, _args| {
            Ok(vm.alloc_instance(recv))
        });

        self.register_core_methods(object, module, kernel, comparable, process);
        self.register_numeric_methods(fixnum, float);
        self.register_string_methods(string, symbol);
        self.register_collection_methods(array, hash);
        self.register_io_methods(io, file);

        // The ordered builtins take their comparison operators from
        // Comparable, driven by their native `<=>`.
        for host in [fixnum, float, string] {
            self.class_data_mut_of(host).includes.push(comparable);
        }

        // Top-level environment: load path, ARGV, and the main object.
        let lib_entry = self.alloc_str(home.join("lib").to_string_lossy());
        let load_path = self.alloc_array(vec![lib_entry]);
        self.globals.insert("LOAD_PATH".to_string(), load_path);
        // `$:` aliases the same array value.
        self.globals.insert(":".to_string(), load_path);

        let argv = self.alloc_array(Vec::new());
        self.object_space.insert("ARGV".to_string(), argv);
        self.object_space.insert("nil".to_string(), self.nil_ref);

        let main = self.alloc_instance(object);
        self.add_own_method(main, "to_s", |vm, _recv, _args| Ok(vm.alloc_str("main")));
        self.add_own_method(main, "require", |vm, _recv, args| {
            let Some(&file) = args.first() else {
                return Err(RuntimeError::raised(
                    "wrong number of arguments (given 0, expected 1)",
                    vm.call_stack.render(),
                ));
            };
            let Payload::Str(name) = &vm.heap.get(file).payload else {
                panic!("require expects a String argument");
            };
            let name = name.clone();
            vm.require_file(&name)
        });
        self.object_space.insert("main".to_string(), main);
        self.main_ref = main;
    }

    fn define_builtin_class(&mut self, name: &str, superclass: ObjRef) -> ObjRef {
        let class_class = self.must_class("Class");
        let class = self.heap.alloc(Obj::new(
            class_class,
            Payload::Class(ClassData::new(name, Some(superclass))),
        ));
        self.add_own_method(class, "new", |vm, recv, _args| Ok(vm.alloc_instance(recv)));
        self.classes.insert(name.to_string(), class);
        class
    }

    /// Allocate a user-defined class with the generic factory. The evaluator
    /// registers it by name only after its body has been evaluated.
    pub(crate) fn define_user_class(&mut self, name: &str, superclass: ObjRef) -> ObjRef {
        let class_class = self.must_class("Class");
        let class = self.heap.alloc(Obj::new(
            class_class,
            Payload::Class(ClassData::new(name, Some(superclass))),
        ));
        self.add_own_method(class, "new", |vm, recv, _args| Ok(vm.alloc_instance(recv)));
        class
    }

    pub(crate) fn define_user_module(&mut self, name: &str) -> ObjRef {
        let module_class = self.must_class("Module");
        self.heap
            .alloc(Obj::new(module_class, Payload::Module(ModuleData::new(name))))
    }
}
