pub mod assembly_ai;
