mod simple_storage;
