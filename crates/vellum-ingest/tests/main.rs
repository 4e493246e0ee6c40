mod end_to_end;
mod fetch_cache;
